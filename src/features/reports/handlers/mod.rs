pub mod admin_report_handler;
pub mod report_handler;

pub use admin_report_handler::*;
pub use report_handler::*;
