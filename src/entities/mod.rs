pub mod prelude;

pub mod audit_log;
pub mod bookings;
pub mod desks;
pub mod users;
