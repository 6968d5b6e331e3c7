use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::entities::{desks, prelude::*};

pub struct DeskRepository {
    conn: DatabaseConnection,
}

impl DeskRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, desk_id: i32) -> Result<Option<desks::Model>> {
        let row = Desks::find_by_id(desk_id).one(&self.conn).await?;
        Ok(row)
    }

    /// Desks a caller may book. Admin-only desks are hidden from regular
    /// users rather than rejected at booking time.
    pub async fn list_bookable(&self, include_admin_only: bool) -> Result<Vec<desks::Model>> {
        let mut query = Desks::find().filter(desks::Column::IsActive.eq(true));

        if !include_admin_only {
            query = query.filter(desks::Column::AdminOnly.eq(false));
        }

        let rows = query.order_by_asc(desks::Column::Name).all(&self.conn).await?;
        Ok(rows)
    }

    /// Every desk, active or not, for the admin fleet view.
    pub async fn list_all(&self) -> Result<Vec<desks::Model>> {
        let rows = Desks::find()
            .order_by_asc(desks::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn insert(
        &self,
        name: &str,
        location: Option<&str>,
        admin_only: bool,
    ) -> Result<desks::Model> {
        let model = desks::ActiveModel {
            name: Set(name.to_string()),
            location: Set(location.map(ToString::to_string)),
            is_active: Set(true),
            admin_only: Set(admin_only),
            ..Default::default()
        };

        let row = model.insert(&self.conn).await?;
        Ok(row)
    }

    pub async fn set_active(&self, desk_id: i32, active: bool) -> Result<bool> {
        let result = Desks::update_many()
            .col_expr(desks::Column::IsActive, Expr::value(active))
            .filter(desks::Column::Id.eq(desk_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_admin_only(&self, desk_id: i32, admin_only: bool) -> Result<bool> {
        let result = Desks::update_many()
            .col_expr(desks::Column::AdminOnly, Expr::value(admin_only))
            .filter(desks::Column::Id.eq(desk_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
