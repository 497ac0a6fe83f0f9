//! Request handlers: forms in, JSON (or CSV) out.
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::bank::{
    AtmError, AtmHandle, Money, SessionId, TransactionError, format_money, money_to_f64, parse_money,
};
use crate::web::{
    errors::{ApiError, LOGIN_PATH, bearer_session, require_session},
    statement::{STATEMENT_FILE_NAME, write_statement},
};

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pin: String,
}

#[derive(Deserialize)]
pub struct AmountForm {
    #[serde(default)]
    amount: String,
}

/// Parses a submitted amount. A caller without a live session is told so
/// before being told about a malformed amount.
async fn parse_amount(atm: &AtmHandle, session: SessionId, input: &str) -> Result<Money, AtmError> {
    match parse_money(input) {
        Ok(amount) => Ok(amount),
        Err(rejection) => {
            if !atm.is_authenticated(session).await? {
                return Err(AtmError::Unauthorized);
            }
            Err(TransactionError::InvalidAmount(rejection).into())
        }
    }
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET / - the login entry point.
pub async fn login_page() -> Json<Value> {
    Json(json!({
        "message": "Please enter your PIN.",
        "login": { "method": "POST", "path": "/login", "fields": ["pin"] },
    }))
}

/// POST /login
///
/// A caller that already holds a token keeps it; anyone else gets a fresh one.
pub async fn login(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Json<Value>, AtmError> {
    let session = bearer_session(&headers).unwrap_or_default();
    atm.authenticate(session, form.pin).await?;
    Ok(Json(json!({
        "token": session.to_string(),
        "message": "Authentication successful!",
    })))
}

/// GET|POST /logout
pub async fn logout(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
) -> Result<Json<Value>, AtmError> {
    if let Some(session) = bearer_session(&headers) {
        atm.logout(session).await?;
    }
    Ok(Json(json!({
        "message": "You have been logged out.",
        "login": LOGIN_PATH,
    })))
}

/// GET /home
pub async fn home(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
) -> Result<Json<Value>, AtmError> {
    let session = require_session(&headers)?;
    if !atm.is_authenticated(session).await? {
        return Err(AtmError::Unauthorized);
    }
    Ok(Json(json!({
        "message": "Welcome to the ATM.",
        "operations": {
            "balance": "GET /balance",
            "deposit": "POST /deposit",
            "withdraw": "POST /withdraw",
            "statement": "GET /statement",
            "download": "GET /statement/download",
            "logout": "POST /logout",
        },
    })))
}

/// GET /balance
pub async fn balance(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
) -> Result<Json<Value>, AtmError> {
    let session = require_session(&headers)?;
    let balance = atm.balance(session).await?;
    Ok(Json(json!({ "balance": money_to_f64(balance) })))
}

/// POST /deposit
pub async fn deposit(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
    Form(form): Form<AmountForm>,
) -> Result<Json<Value>, AtmError> {
    let session = require_session(&headers)?;
    let amount = parse_amount(&atm, session, &form.amount).await?;
    let balance = atm.deposit(session, amount).await?;
    Ok(Json(json!({
        "message": format!("${} deposited successfully!", format_money(amount)),
        "balance": money_to_f64(balance),
    })))
}

/// POST /withdraw
pub async fn withdraw(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
    Form(form): Form<AmountForm>,
) -> Result<Json<Value>, AtmError> {
    let session = require_session(&headers)?;
    let amount = parse_amount(&atm, session, &form.amount).await?;
    let balance = atm.withdraw(session, amount).await?;
    Ok(Json(json!({
        "message": format!("${} withdrawn successfully!", format_money(amount)),
        "balance": money_to_f64(balance),
    })))
}

/// GET /statement
pub async fn statement(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
) -> Result<Json<Value>, AtmError> {
    let session = require_session(&headers)?;
    let transactions = atm.statement(session).await?;
    Ok(Json(json!({ "transactions": transactions })))
}

/// GET /statement/download
pub async fn download_statement(
    State(atm): State<AtmHandle>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&headers)?;
    let transactions = atm.statement(session).await?;
    let body = write_statement(&transactions)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{STATEMENT_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}
