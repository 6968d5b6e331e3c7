pub use super::audit_log::Entity as AuditLog;
pub use super::bookings::Entity as Bookings;
pub use super::desks::Entity as Desks;
pub use super::users::Entity as Users;
