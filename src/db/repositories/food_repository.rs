use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::food::{Food, NewFood};
use crate::db::schema::foods;
use diesel::prelude::*;
use uuid::Uuid;

pub struct FoodRepository;

impl FoodRepository {
    pub fn create(new_food: &NewFood) -> Result<Food, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(foods::table)
            .values(new_food)
            .get_result::<Food>(&mut conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(id: Uuid) -> Result<Option<Food>, RepositoryError> {
        let mut conn = get_connection()?;

        foods::table
            .filter(foods::id.eq(id))
            .first::<Food>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Recherche plein-texte naïve sur le nom (ILIKE), plats disponibles
    /// uniquement. Les résultats passent par le cache applicatif.
    pub fn search(query: &str, limit: i64) -> Result<Vec<Food>, RepositoryError> {
        let mut conn = get_connection()?;
        let pattern = format!("%{}%", query);

        foods::table
            .filter(foods::name.ilike(pattern))
            .filter(foods::available.eq(true))
            .order_by(foods::name.asc())
            .limit(limit)
            .load::<Food>(&mut conn)
            .map_err(Into::into)
    }

    /// Plats d'une enterprise (tableau de bord)
    pub fn list_for_enterprise(enterprise_id: Uuid) -> Result<Vec<Food>, RepositoryError> {
        let mut conn = get_connection()?;

        foods::table
            .filter(foods::enterprise_id.eq(enterprise_id))
            .order_by(foods::created_at.desc())
            .load::<Food>(&mut conn)
            .map_err(Into::into)
    }

    /// Plats disponibles parmi une liste d'IDs (checkout)
    pub fn find_available_by_ids(ids: &[Uuid]) -> Result<Vec<Food>, RepositoryError> {
        let mut conn = get_connection()?;

        foods::table
            .filter(foods::id.eq_any(ids))
            .filter(foods::available.eq(true))
            .load::<Food>(&mut conn)
            .map_err(Into::into)
    }

    pub fn delete(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(foods::table.filter(foods::id.eq(id))).execute(&mut conn)?;

        Ok(())
    }
}
