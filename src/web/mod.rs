//! HTTP front end for the ATM.
mod errors;
mod handlers;
mod statement;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::bank::AtmHandle;

/// Builds the router over a running ATM.
pub fn router(atm: AtmHandle) -> Router {
    Router::new()
        .route("/", get(handlers::login_page))
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route("/home", get(handlers::home))
        .route("/balance", get(handlers::balance))
        .route("/deposit", post(handlers::deposit))
        .route("/withdraw", post(handlers::withdraw))
        .route("/statement", get(handlers::statement))
        .route("/statement/download", get(handlers::download_statement))
        .layer(TraceLayer::new_for_http())
        .with_state(atm)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, Bytes},
        http::{HeaderMap, Request, StatusCode, header},
    };
    use chrono::Duration;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::bank::Account;

    fn create_test_app() -> Router {
        let (atm, _task) = AtmHandle::spawn(Account::new("1234", 5_000_000), Duration::minutes(15), 16);
        router(atm)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let (status, _, body) = send(app, request.body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_form(app: &Router, uri: &str, token: Option<&str>, form: &str) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let (status, _, body) = send(app, request.body(Body::from(form.to_string())).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn login(app: &Router) -> String {
        let (status, body) = post_form(app, "/login", None, "pin=1234").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_check_returns_200() {
        let app = create_test_app();
        let (status, body) = get_json(&app, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn login_with_wrong_pin_is_rejected() {
        let app = create_test_app();
        let (status, body) = post_form(&app, "/login", None, "pin=0000").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "authentication_failed");
        assert_eq!(body["message"], "Invalid PIN. Please try again.");
    }

    #[tokio::test]
    async fn protected_endpoints_require_login() {
        let app = create_test_app();
        for uri in ["/home", "/balance", "/statement", "/statement/download"] {
            let (status, body) = get_json(&app, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["message"], "Please log in to access the ATM.");
            assert_eq!(body["login"], "/");
        }

        let stranger = crate::bank::SessionId::new().to_string();
        for uri in ["/deposit", "/withdraw"] {
            let (status, body) = post_form(&app, uri, Some(&stranger), "amount=abc").await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "unauthorized");
            let (status, _) = post_form(&app, uri, Some(&stranger), "amount=10").await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn deposit_and_withdraw_scenario() {
        let app = create_test_app();
        let token = login(&app).await;

        let (status, body) = get_json(&app, "/home", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["operations"]["deposit"].is_string());

        let (_, body) = get_json(&app, "/balance", Some(&token)).await;
        assert_eq!(body["balance"], 500.0);

        let (status, body) = post_form(&app, "/deposit", Some(&token), "amount=100").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "$100.00 deposited successfully!");
        assert_eq!(body["balance"], 600.0);

        let (status, body) = post_form(&app, "/withdraw", Some(&token), "amount=700").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Insufficient funds.");

        let (status, body) = post_form(&app, "/withdraw", Some(&token), "amount=600").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "$600.00 withdrawn successfully!");
        assert_eq!(body["balance"], 0.0);

        let (_, body) = get_json(&app, "/statement", Some(&token)).await;
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0]["type"], "Deposit");
        assert_eq!(transactions[0]["amount"], 100.0);
        assert_eq!(transactions[1]["type"], "Withdrawal");
        assert_eq!(transactions[1]["amount"], 600.0);
    }

    #[tokio::test]
    async fn invalid_amounts_are_reported() {
        let app = create_test_app();
        let token = login(&app).await;

        for (form, message) in [
            ("amount=abc", "Invalid input. Please enter a number."),
            ("amount=", "Invalid input. Please enter a number."),
            ("", "Invalid input. Please enter a number."),
            ("amount=0", "Amount must be greater than zero."),
            ("amount=-5", "Amount must be greater than zero."),
            ("amount=0.00001", "Amount must be greater than zero."),
            ("amount=1e15", "Invalid input. Please enter a number."),
        ] {
            for uri in ["/deposit", "/withdraw"] {
                let (status, body) = post_form(&app, uri, Some(&token), form).await;
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri} {form}");
                assert_eq!(body["error"], "invalid_amount");
                assert_eq!(body["message"], message);
            }
        }

        let (_, body) = get_json(&app, "/balance", Some(&token)).await;
        assert_eq!(body["balance"], 500.0);
        let (_, body) = get_json(&app, "/statement", Some(&token)).await;
        assert!(body["transactions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_amounts_carry_the_reason() {
        let app = create_test_app();
        let token = login(&app).await;

        for (form, reason) in [
            ("amount=0.00001", "amount is smaller than the smallest unit of 0.0001"),
            ("amount=0", "amount must be greater than zero"),
            ("amount=1e15", "amount is too large"),
            ("amount=abc", "amount is not a number"),
        ] {
            let (_, body) = post_form(&app, "/deposit", Some(&token), form).await;
            assert_eq!(body["reason"], reason, "{form}");
        }
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = create_test_app();
        let token = login(&app).await;

        let (status, body) = post_form(&app, "/logout", Some(&token), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "You have been logged out.");

        let (status, _) = get_json(&app, "/balance", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // already logged out, and no session at all
        let (status, _) = get_json(&app, "/logout", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get_json(&app, "/logout", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn sessions_share_one_account() {
        let app = create_test_app();
        let first = login(&app).await;
        let second = login(&app).await;
        assert_ne!(first, second);

        post_form(&app, "/deposit", Some(&first), "amount=25.50").await;
        let (_, body) = get_json(&app, "/balance", Some(&second)).await;
        assert_eq!(body["balance"], 525.5);
    }

    #[tokio::test]
    async fn download_statement_as_csv() {
        let app = create_test_app();
        let token = login(&app).await;
        post_form(&app, "/deposit", Some(&token), "amount=100").await;
        post_form(&app, "/withdraw", Some(&token), "amount=600").await;
        post_form(&app, "/withdraw", Some(&token), "amount=1").await;

        let request = Request::builder()
            .uri("/statement/download")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"transaction_statement.csv\""
        );

        let csv = String::from_utf8(body.to_vec()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Date,Transaction Type,Amount");
        assert!(lines[1].ends_with(",Deposit,100.00"));
        assert!(lines[2].ends_with(",Withdrawal,600.00"));
    }
}
