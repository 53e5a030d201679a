//! Fine payment initiation. The signed payload is built by the adapters in
//! `crate::payment`; this module decides HTTP shapes.
//!
//! Error mapping is asymmetric on purpose: a MoMo failure is an upstream
//! error (500), a ZaloPay transport failure reports as a bad request (400),
//! matching the original contract.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::db::AppState;
use crate::payment::{momo, zalopay};

#[derive(Deserialize)]
pub struct MomoOrderRequest {
    pub amount: i64,
    pub order_info: Option<String>,
}

pub async fn momo_order(
    State(state): State<AppState>,
    Json(payload): Json<MomoOrderRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(config) = state.config.momo.as_ref() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "MoMo gateway is not configured" })),
        ));
    };

    let order_info = payload
        .order_info
        .unwrap_or_else(|| "Library fine payment".to_string());

    momo::create_order(&state.http, config, payload.amount, &order_info)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("momo order failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })
}

#[derive(Deserialize)]
pub struct ZaloPayOrderRequest {
    pub amount: i64,
    pub app_user: Option<String>,
    pub bank_code: Option<String>,
}

pub async fn zalopay_order(
    State(state): State<AppState>,
    Json(payload): Json<ZaloPayOrderRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(config) = state.config.zalopay.as_ref() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "ZaloPay gateway is not configured" })),
        ));
    };

    let app_user = payload.app_user.unwrap_or_else(|| "user123".to_string());
    let bank_code = payload.bank_code.unwrap_or_else(|| "zalopayapp".to_string());

    zalopay::create_order(&state.http, config, payload.amount, &app_user, &bank_code)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("zalopay order failed: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
        })
}
