use chrono::{NaiveDate, NaiveTime};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking lifecycle state. `Cancelled` and `NoShow` are terminal.
///
/// Checked-in is deliberately not a state: it is an orthogonal flag on the
/// row, and a checked-in booking stays `Booked` past its end time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "booked")]
    Booked,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

impl BookingStatus {
    /// Terminal states admit no further lifecycle transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::NoShow)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub desk_id: i32,

    /// Calendar day, no timezone component.
    pub date: NaiveDate,

    /// Wall-clock, minute granularity, same day as `date`, start < end.
    pub start_time: NaiveTime,

    pub end_time: NaiveTime,

    pub status: BookingStatus,

    pub checked_in: bool,

    pub created_at: String,

    /// Opaque reference to an event the surrounding system created in an
    /// external calendar. Stored and handed back on cancel, never dialled.
    pub calendar_event_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::desks::Entity",
        from = "Column::DeskId",
        to = "super::desks::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Desks,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::desks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Desks.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
