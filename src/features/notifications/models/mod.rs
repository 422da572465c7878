mod app_state;

pub use app_state::{AppState, APP_STATE_ID};
