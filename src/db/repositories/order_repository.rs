use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::order::{NewOrder, Order, OrderStatus};
use crate::db::schema::orders;
use diesel::dsl::sum;
use diesel::prelude::*;
use uuid::Uuid;

pub struct OrderRepository;

impl OrderRepository {
    pub fn create(new_order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(orders::table)
            .values(new_order)
            .get_result::<Order>(&mut conn)
            .map_err(Into::into)
    }

    /// Issue du paiement: statut final + identifiant de charge éventuel
    pub fn settle(
        id: Uuid,
        status: OrderStatus,
        charge_id: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(orders::table.filter(orders::id.eq(id)))
            .set((orders::status.eq(status), orders::charge_id.eq(charge_id)))
            .get_result::<Order>(&mut conn)
            .map_err(Into::into)
    }

    pub fn list_for_account(account_id: Uuid, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = get_connection()?;

        orders::table
            .filter(orders::account_id.eq(account_id))
            .order_by(orders::created_at.desc())
            .limit(limit)
            .load::<Order>(&mut conn)
            .map_err(Into::into)
    }

    /// Agrégat de revenus d'une enterprise: commandes payées uniquement.
    pub fn revenue_for_enterprise(enterprise_id: Uuid) -> Result<(i64, i64), RepositoryError> {
        let mut conn = get_connection()?;

        let order_count = orders::table
            .filter(orders::enterprise_id.eq(enterprise_id))
            .filter(orders::status.eq(OrderStatus::Paid))
            .count()
            .get_result::<i64>(&mut conn)?;

        let total_cents = orders::table
            .filter(orders::enterprise_id.eq(enterprise_id))
            .filter(orders::status.eq(OrderStatus::Paid))
            .select(sum(orders::total_cents))
            .get_result::<Option<i64>>(&mut conn)?
            .unwrap_or(0);

        Ok((order_count, total_cents))
    }

    pub fn delete_for_account(account_id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(orders::table.filter(orders::account_id.eq(account_id)))
            .execute(&mut conn)?;

        Ok(())
    }
}
