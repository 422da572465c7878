//! Outgoing notifications: debounced admin alerts on new reports and
//! approval/rejection emails to report authors.

pub mod models;
pub mod services;
pub mod throttle;

pub use services::{LinkBuilder, NotificationService};
pub use throttle::AlertThrottle;
