use axum::{
    routing::{get, post},
    Router,
};

use crate::features::users::handlers::{ban_user, unsubscribe, UsersState};

pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/api/admin/users/{user_id}/ban", post(ban_user))
        .route("/api/unsubscribe", get(unsubscribe))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::{UserRole, UserStatus};
    use crate::features::users::services::{UnsubscribeSigner, UserService};
    use crate::shared::test_helpers::{insert_user, lazy_pool, test_user, with_user};
    use axum::http::{header, StatusCode};
    use sqlx::PgPool;
    use std::sync::Arc;
    use axum_test::TestServer;
    use uuid::Uuid;

    const SECRET: &str = "unit-test-secret-with-enough-length!";

    fn state() -> UsersState {
        state_on(lazy_pool())
    }

    fn state_on(pool: PgPool) -> UsersState {
        UsersState {
            user_service: Arc::new(UserService::new(pool)),
            signer: UnsubscribeSigner::new(SECRET),
            frontend_url: "http://web.test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ban_requires_session() {
        let server = TestServer::new(routes(state())).unwrap();
        server
            .post(&format!("/api/admin/users/{}/ban", Uuid::new_v4()))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ban_requires_admin() {
        for role in [UserRole::Newcomer, UserRole::Visitor, UserRole::Citizen] {
            let app = with_user(routes(state()), test_user(role));
            let server = TestServer::new(app).unwrap();
            server
                .post(&format!("/api/admin/users/{}/ban", Uuid::new_v4()))
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_unsubscribe_requires_user_id() {
        let server = TestServer::new(routes(state())).unwrap();
        server
            .get("/api/unsubscribe")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/unsubscribe?userId=not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsubscribe_rejects_token_of_other_user() {
        let signer = UnsubscribeSigner::new(SECRET);
        let token = signer.sign(Uuid::new_v4());

        let server = TestServer::new(routes(state())).unwrap();
        server
            .get(&format!(
                "/api/unsubscribe?userId={}&token={}",
                Uuid::new_v4(),
                token
            ))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unsubscribe_defaults_to_french_page(pool: PgPool) {
        let user = insert_user(&pool, UserRole::Visitor, UserStatus::Active).await;
        let token = UnsubscribeSigner::new(SECRET).sign(user.id);
        let server = TestServer::new(routes(state_on(pool.clone()))).unwrap();

        let response = server
            .get(&format!("/api/unsubscribe?userId={}&token={}", user.id, token))
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header(header::LOCATION).to_str().unwrap(),
            "http://web.test/fr/unsubscribe"
        );

        let response = server
            .get(&format!(
                "/api/unsubscribe?userId={}&token={}&locale=en",
                user.id, token
            ))
            .await;
        assert_eq!(
            response.header(header::LOCATION).to_str().unwrap(),
            "http://web.test/en/unsubscribe"
        );

        let notify: bool =
            sqlx::query_scalar("SELECT notify_on_status_change FROM users WHERE id = $1")
                .bind(user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(!notify);
    }
}
