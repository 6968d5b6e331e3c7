pub mod audit;
pub mod booking;
pub mod desk;
pub mod user;

pub use audit::AuditRepository;
pub use booking::{BookingRepository, ComplianceRow, NoShowRow};
pub use desk::DeskRepository;
pub use user::UserRepository;
