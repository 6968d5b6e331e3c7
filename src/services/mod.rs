pub mod audit;
pub use audit::AuditRecorder;

pub mod booking_service;
pub use booking_service::{BookingError, BookingService};

pub mod booking_service_impl;
pub use booking_service_impl::SeaOrmBookingService;

pub mod query_service;
pub use query_service::QueryService;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod sweeper;
pub use sweeper::NoShowSweeper;
