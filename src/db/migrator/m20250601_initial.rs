use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Desks seeded into an empty installation; real fleets are managed through
/// the admin desk endpoints afterwards.
const DEFAULT_DESKS: [(&str, &str); 3] = [
    ("Desk 1", "Office"),
    ("Desk 2", "Office"),
    ("Desk 3", "Office"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Desks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Bookings)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuditLog)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Availability and schedule lookups are keyed by (desk, date).
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_desk_date")
                    .table(Bookings)
                    .col(crate::entities::bookings::Column::DeskId)
                    .col(crate::entities::bookings::Column::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_user")
                    .table(Bookings)
                    .col(crate::entities::bookings::Column::UserId)
                    .to_owned(),
            )
            .await?;

        for (name, location) in DEFAULT_DESKS {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Desks)
                .columns([
                    crate::entities::desks::Column::Name,
                    crate::entities::desks::Column::Location,
                    crate::entities::desks::Column::IsActive,
                    crate::entities::desks::Column::AdminOnly,
                ])
                .values_panic([name.into(), location.into(), true.into(), false.into()])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLog).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Desks).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
