use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
};

use crate::entities::{audit_log, prelude::*};

pub struct AuditRepository {
    conn: DatabaseConnection,
}

impl AuditRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn append(&self, actor_email: &str, action: &str, details: &str) -> Result<()> {
        let model = audit_log::ActiveModel {
            actor_email: Set(actor_email.to_string()),
            action: Set(action.to_string()),
            details: Set(details.to_string()),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        model.insert(&self.conn).await?;
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<audit_log::Model>> {
        let rows = AuditLog::find()
            .order_by_desc(audit_log::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}
