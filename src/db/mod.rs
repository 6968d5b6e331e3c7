use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::booking::{ComplianceRow, NoShowRow};

use crate::entities::{audit_log, bookings, desks, users};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn booking_repo(&self) -> repositories::booking::BookingRepository {
        repositories::booking::BookingRepository::new(self.conn.clone())
    }

    fn desk_repo(&self) -> repositories::desk::DeskRepository {
        repositories::desk::DeskRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn audit_repo(&self) -> repositories::audit::AuditRepository {
        repositories::audit::AuditRepository::new(self.conn.clone())
    }

    pub async fn get_booking(&self, booking_id: i32) -> Result<Option<bookings::Model>> {
        self.booking_repo().get(booking_id).await
    }

    pub async fn active_bookings_for_desk_date(
        &self,
        desk_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        self.booking_repo().active_for_desk_date(desk_id, date).await
    }

    pub async fn bookings_for_desk_date(
        &self,
        desk_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        self.booking_repo().for_desk_date(desk_id, date).await
    }

    pub async fn upcoming_bookings_for_user(
        &self,
        user_id: i32,
        today: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        self.booking_repo().upcoming_for_user(user_id, today).await
    }

    pub async fn past_bookings_for_user(
        &self,
        user_id: i32,
        today: NaiveDate,
    ) -> Result<Vec<bookings::Model>> {
        self.booking_repo().past_for_user(user_id, today).await
    }

    pub async fn list_all_bookings(&self) -> Result<Vec<bookings::Model>> {
        self.booking_repo().list_all().await
    }

    pub async fn set_booking_checked_in(&self, booking_id: i32) -> Result<u64> {
        self.booking_repo().set_checked_in(booking_id).await
    }

    pub async fn cancel_booking_if_booked(&self, booking_id: i32) -> Result<u64> {
        self.booking_repo().cancel_if_booked(booking_id).await
    }

    pub async fn mark_booking_no_show_if_eligible(&self, booking_id: i32) -> Result<u64> {
        self.booking_repo().mark_no_show_if_eligible(booking_id).await
    }

    pub async fn no_show_candidates(
        &self,
        cutoff_date: NaiveDate,
        cutoff_time: NaiveTime,
    ) -> Result<Vec<bookings::Model>> {
        self.booking_repo()
            .no_show_candidates(cutoff_date, cutoff_time)
            .await
    }

    pub async fn no_show_report(&self) -> Result<Vec<NoShowRow>> {
        self.booking_repo().no_show_report().await
    }

    pub async fn compliance_summary(&self) -> Result<Vec<ComplianceRow>> {
        self.booking_repo().compliance_summary().await
    }

    pub async fn get_desk(&self, desk_id: i32) -> Result<Option<desks::Model>> {
        self.desk_repo().get(desk_id).await
    }

    pub async fn list_bookable_desks(&self, include_admin_only: bool) -> Result<Vec<desks::Model>> {
        self.desk_repo().list_bookable(include_admin_only).await
    }

    pub async fn list_all_desks(&self) -> Result<Vec<desks::Model>> {
        self.desk_repo().list_all().await
    }

    pub async fn add_desk(
        &self,
        name: &str,
        location: Option<&str>,
        admin_only: bool,
    ) -> Result<desks::Model> {
        self.desk_repo().insert(name, location, admin_only).await
    }

    pub async fn set_desk_active(&self, desk_id: i32, active: bool) -> Result<bool> {
        self.desk_repo().set_active(desk_id, active).await
    }

    pub async fn set_desk_admin_only(&self, desk_id: i32, admin_only: bool) -> Result<bool> {
        self.desk_repo().set_admin_only(desk_id, admin_only).await
    }

    pub async fn get_user(&self, user_id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get(user_id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn ensure_user(&self, email: &str, name: &str) -> Result<users::Model> {
        self.user_repo().ensure(email, name).await
    }

    pub async fn list_all_users(&self) -> Result<Vec<users::Model>> {
        self.user_repo().list_all().await
    }

    pub async fn set_user_can_book(&self, user_id: i32, can_book: bool) -> Result<bool> {
        self.user_repo().set_can_book(user_id, can_book).await
    }

    pub async fn append_audit(&self, actor_email: &str, action: &str, details: &str) -> Result<()> {
        self.audit_repo().append(actor_email, action, details).await
    }

    pub async fn recent_audit(&self, limit: u64) -> Result<Vec<audit_log::Model>> {
        self.audit_repo().recent(limit).await
    }
}
