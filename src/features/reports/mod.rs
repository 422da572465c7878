pub mod dtos;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;

pub use policy::ModerationPolicy;
pub use routes::routes;
pub use services::ReportService;
