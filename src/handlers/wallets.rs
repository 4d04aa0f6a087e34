use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;
use crate::models::{NewWallet, Wallet};
use crate::AppState;

type ErrorResponse = (StatusCode, Json<serde_json::Value>);

/// Maps ledger failure kinds onto status codes. Storage failures are logged
/// here; the response body never carries store internals.
fn ledger_error(err: LedgerError) -> ErrorResponse {
    match err {
        LedgerError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Wallet not found"})),
        ),
        LedgerError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": message})),
        ),
        LedgerError::Storage { .. } => {
            tracing::error!("Ledger storage failure: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Database error"})),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct CreateWalletRequest {
    pub uid: String,
    #[serde(default)]
    pub amount: i64,
}

#[derive(Deserialize)]
pub struct UpdateWalletRequest {
    pub uid: String,
    #[serde(default)]
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Deposit,
    Withdraw,
}

#[derive(Deserialize)]
pub struct ChangeAmountRequest {
    #[serde(rename = "walletId")]
    pub wallet_uid: String,
    #[serde(rename = "operationType")]
    pub operation_type: OperationType,
    pub amount: i64,
}

/// Create a new wallet. The store assigns the id; the uid comes from the
/// caller.
pub async fn create_wallet(
    State(state): State<AppState>,
    Json(payload): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<Wallet>), ErrorResponse> {
    let wallet = state
        .ledger
        .create(NewWallet {
            uid: payload.uid,
            amount: payload.amount,
        })
        .await
        .map_err(ledger_error)?;

    Ok((StatusCode::CREATED, Json(wallet)))
}

/// List all wallets. Order is store-defined.
pub async fn list_wallets(
    State(state): State<AppState>,
) -> Result<Json<Vec<Wallet>>, ErrorResponse> {
    let wallets = state.ledger.get_all().await.map_err(ledger_error)?;

    Ok(Json(wallets))
}

/// Get wallet by its numeric id.
pub async fn get_wallet(
    Path(wallet_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Wallet>, ErrorResponse> {
    let wallet = state.ledger.get(wallet_id).await.map_err(ledger_error)?;

    Ok(Json(wallet))
}

/// Get wallet by its external uid.
pub async fn get_wallet_by_uid(
    Path(wallet_uid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Wallet>, ErrorResponse> {
    let wallet = state
        .ledger
        .get_by_uid(&wallet_uid)
        .await
        .map_err(ledger_error)?;

    Ok(Json(wallet))
}

/// Update wallet. The id always comes from the path; an id in the payload is
/// ignored.
pub async fn update_wallet(
    Path(wallet_id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateWalletRequest>,
) -> Result<Json<Wallet>, ErrorResponse> {
    let wallet = state
        .ledger
        .update(Wallet {
            id: wallet_id,
            uid: payload.uid,
            amount: payload.amount,
        })
        .await
        .map_err(ledger_error)?;

    Ok(Json(wallet))
}

/// Delete wallet (hard delete).
pub async fn delete_wallet(
    Path(wallet_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ErrorResponse> {
    state.ledger.delete(wallet_id).await.map_err(ledger_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deposit to or withdraw from the wallet named by uid. The operation type
/// selects the sign; the requested amount itself must be positive.
pub async fn change_amount(
    State(state): State<AppState>,
    Json(payload): Json<ChangeAmountRequest>,
) -> Result<Json<Wallet>, ErrorResponse> {
    if Uuid::parse_str(&payload.wallet_uid).is_err() {
        return Err(ledger_error(LedgerError::Validation(format!(
            "Invalid walletId: {}",
            payload.wallet_uid
        ))));
    }

    if payload.amount <= 0 {
        return Err(ledger_error(LedgerError::Validation(
            "Amount must be positive".to_string(),
        )));
    }

    let delta = match payload.operation_type {
        OperationType::Deposit => payload.amount,
        OperationType::Withdraw => -payload.amount,
    };

    let wallet = state
        .ledger
        .change_amount(&payload.wallet_uid, delta)
        .await
        .map_err(ledger_error)?;

    Ok(Json(wallet))
}
