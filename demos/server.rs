// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! REST API server for the account ledger.
//!
//! Run with: `cargo run --example server`
//!
//! # Endpoints
//!
//! - `POST /v1/accounts` - Create an account
//! - `GET /v1/accounts/{id}` - Get account by ID
//! - `POST /v1/accounts/transferAmount` - Transfer between two accounts
//!
//! # Example
//!
//! ```bash
//! # Create accounts
//! curl -X POST http://localhost:3000/v1/accounts \
//!   -H "Content-Type: application/json" \
//!   -d '{"accountId": "Id-1", "balance": "100.00"}'
//!
//! # Transfer
//! curl -X POST http://localhost:3000/v1/accounts/transferAmount \
//!   -H "Content-Type: application/json" \
//!   -d '{"accountFrom": "Id-1", "accountTo": "Id-2", "transferAmount": "25.00"}'
//!
//! # Get account
//! curl http://localhost:3000/v1/accounts/Id-1
//! ```

use account_ledger_rs::{Account, AccountError, AccountId, Ledger, TransferError};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

// === Request/Response DTOs ===

/// Request body for creating accounts.
///
/// ```json
/// {"accountId": "Id-1", "balance": "100.00"}
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_id: String,
    #[serde(default)]
    pub balance: Decimal,
}

/// Request body for transfers.
///
/// ```json
/// {"accountFrom": "Id-1", "accountTo": "Id-2", "transferAmount": "25.00"}
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub account_from: String,
    pub account_to: String,
    pub transfer_amount: Decimal,
}

/// Response body for account information.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_id: String,
    pub balance: Decimal,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id().to_string(),
            balance: account.balance(),
        }
    }
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the ledger.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

// === Error Handling ===

/// Wrapper for converting ledger errors into HTTP responses.
pub enum AppError {
    Account(AccountError),
    Transfer(TransferError),
    Internal(String),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        AppError::Account(err)
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        AppError::Transfer(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Account(err) => {
                let (status, code) = match err {
                    AccountError::DuplicateAccount(_) => {
                        (StatusCode::BAD_REQUEST, "DUPLICATE_ACCOUNT")
                    }
                    AccountError::AccountNotFound(_) => {
                        (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND")
                    }
                    AccountError::NegativeBalance => (StatusCode::BAD_REQUEST, "NEGATIVE_BALANCE"),
                };
                (status, code, err.to_string())
            }
            AppError::Transfer(err) => {
                let (status, code) = match err {
                    TransferError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
                    TransferError::SelfTransferNotAllowed => {
                        (StatusCode::BAD_REQUEST, "SELF_TRANSFER")
                    }
                    TransferError::AccountNotFound(_) => {
                        (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND")
                    }
                    TransferError::InsufficientBalance => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_BALANCE")
                    }
                };
                (status, code, err.to_string())
            }
            AppError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message.clone())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /v1/accounts - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<StatusCode, AppError> {
    tracing::info!(account = %request.account_id, "creating account");
    state
        .ledger
        .create_account(request.account_id, request.balance)?;
    Ok(StatusCode::CREATED)
}

/// GET /v1/accounts/{id} - Get account by ID.
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    tracing::info!(account = %id, "retrieving account");
    let account = state.ledger.get_account(&AccountId::from(id))?;
    Ok(Json(account.into()))
}

/// POST /v1/accounts/transferAmount - Transfer between accounts.
///
/// The ledger call blocks on the transfer lock, so it runs on the blocking
/// pool instead of a runtime worker.
async fn transfer_amount(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<(StatusCode, &'static str), AppError> {
    let from = AccountId::from(request.account_from);
    let to = AccountId::from(request.account_to);
    let amount = request.transfer_amount;

    let ledger = Arc::clone(&state.ledger);
    tokio::task::spawn_blocking(move || ledger.transfer(&from, &to, amount))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok((StatusCode::ACCEPTED, "Transfer Completed"))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/accounts", post(create_account))
        .route("/v1/accounts/transferAmount", post(transfer_amount))
        .route("/v1/accounts/{id}", get(get_account))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = AppState {
        ledger: Arc::new(Ledger::new()),
    };

    let app = create_router(state);

    let addr = std::env::var("LEDGER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    println!("Ledger API server running on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  POST /v1/accounts                 - Create an account");
    println!("  GET  /v1/accounts/:id             - Get account by ID");
    println!("  POST /v1/accounts/transferAmount  - Transfer between accounts");

    axum::serve(listener, app).await
}
