use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::voucher::{NewVoucher, Voucher};
use crate::db::schema::vouchers;
use diesel::prelude::*;
use uuid::Uuid;

pub struct VoucherRepository;

impl VoucherRepository {
    pub fn create(new_voucher: &NewVoucher) -> Result<Voucher, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(vouchers::table)
            .values(new_voucher)
            .get_result::<Voucher>(&mut conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(id: Uuid) -> Result<Option<Voucher>, RepositoryError> {
        let mut conn = get_connection()?;

        vouchers::table
            .filter(vouchers::id.eq(id))
            .first::<Voucher>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Bon de réduction approuvé, par code (checkout)
    pub fn find_approved_by_code(code: &str) -> Result<Option<Voucher>, RepositoryError> {
        let mut conn = get_connection()?;

        vouchers::table
            .filter(vouchers::code.eq(code))
            .filter(vouchers::approved.eq(true))
            .first::<Voucher>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Liste publique des bons approuvés (servie via le cache)
    pub fn list_approved() -> Result<Vec<Voucher>, RepositoryError> {
        let mut conn = get_connection()?;

        vouchers::table
            .filter(vouchers::approved.eq(true))
            .order_by(vouchers::created_at.desc())
            .load::<Voucher>(&mut conn)
            .map_err(Into::into)
    }

    /// Bons en attente d'approbation (back-office)
    pub fn list_pending() -> Result<Vec<Voucher>, RepositoryError> {
        let mut conn = get_connection()?;

        vouchers::table
            .filter(vouchers::approved.eq(false))
            .order_by(vouchers::created_at.asc())
            .load::<Voucher>(&mut conn)
            .map_err(Into::into)
    }

    pub fn approve(id: Uuid) -> Result<Voucher, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(vouchers::table.filter(vouchers::id.eq(id)))
            .set(vouchers::approved.eq(true))
            .get_result::<Voucher>(&mut conn)
            .map_err(Into::into)
    }

    pub fn delete(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(vouchers::table.filter(vouchers::id.eq(id))).execute(&mut conn)?;

        Ok(())
    }
}
