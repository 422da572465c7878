use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::ReportService;

/// Create routes for the reports feature
///
/// Listing is public; submission needs a session; `/api/admin` routes need an administrator.
pub fn routes(report_service: Arc<ReportService>) -> Router {
    let state = ReportState { report_service };

    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route("/api/reports/{id}", get(handlers::get_report))
        .route("/api/admin/reports", get(handlers::list_pending_reports))
        .route("/api/admin/reports/{id}", patch(handlers::moderate_report))
        .with_state(state)
}
