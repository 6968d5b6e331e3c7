use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::entities::{prelude::*, users};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<users::Model>> {
        let row = Users::find_by_id(user_id).one(&self.conn).await?;
        Ok(row)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        let row = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?;

        Ok(row)
    }

    /// Fetches the user for an email, provisioning a fresh account on first
    /// sight. New accounts start as regular users allowed to book.
    pub async fn ensure(&self, email: &str, name: &str) -> Result<users::Model> {
        if let Some(existing) = self.get_by_email(email).await? {
            return Ok(existing);
        }

        let model = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            role: Set("user".to_string()),
            can_book: Set(true),
            is_active: Set(true),
            ..Default::default()
        };

        match model.insert(&self.conn).await {
            Ok(row) => Ok(row),
            // Two first requests can race past the lookup; the loser hits
            // the unique email index and takes the winner's row instead.
            Err(err) => match self.get_by_email(email).await? {
                Some(existing) => Ok(existing),
                None => Err(err.into()),
            },
        }
    }

    pub async fn list_all(&self) -> Result<Vec<users::Model>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn set_can_book(&self, user_id: i32, can_book: bool) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(users::Column::CanBook, Expr::value(can_book))
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
