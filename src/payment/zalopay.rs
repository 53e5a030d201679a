//! ZaloPay-style gateway adapter.
//!
//! The mac input is a pipe-delimited canonical string and the full parameter
//! set goes out form-urlencoded.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ZaloPayConfig;
use crate::domain::DomainError;

use super::hmac_sha256_hex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZaloPayOrder {
    pub app_id: i64,
    pub app_trans_id: String,
    pub app_user: String,
    pub app_time: i64,
    pub embed_data: String,
    pub item: String,
    pub amount: i64,
    pub description: String,
    pub bank_code: String,
    pub mac: String,
}

/// `%y%m%d_{n}` with a random n in [0, 1_000_000). The random component
/// means ids can collide for orders created on the same day.
pub fn app_trans_id(date: NaiveDate, trans_id: u32) -> String {
    format!("{}_{}", date.format("%y%m%d"), trans_id)
}

/// Pipe-delimited canonical string signed as `mac`. Field order is part of
/// the protocol.
pub fn mac_payload(
    app_id: i64,
    app_trans_id: &str,
    app_user: &str,
    amount: i64,
    app_time: i64,
    embed_data: &str,
    item: &str,
) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        app_id, app_trans_id, app_user, amount, app_time, embed_data, item
    )
}

/// Build the signed order. Clock and random suffix come in as parameters so
/// the mac is reproducible under test.
pub fn build_order(
    config: &ZaloPayConfig,
    amount: i64,
    app_user: &str,
    bank_code: &str,
    date: NaiveDate,
    trans_id: u32,
    now_millis: i64,
) -> ZaloPayOrder {
    let app_trans_id = app_trans_id(date, trans_id);
    let embed_data = json!({}).to_string();
    let item = json!([{
        "itemid": "fine",
        "itemname": "Overdue fine",
        "itemprice": amount,
        "itemquantity": 1
    }])
    .to_string();

    let mac = hmac_sha256_hex(
        &config.key1,
        &mac_payload(
            config.app_id,
            &app_trans_id,
            app_user,
            amount,
            now_millis,
            &embed_data,
            &item,
        ),
    );

    ZaloPayOrder {
        app_id: config.app_id,
        description: format!("Overdue fine payment #{}", trans_id),
        app_trans_id,
        app_user: app_user.to_string(),
        app_time: now_millis,
        embed_data,
        item,
        amount,
        bank_code: bank_code.to_string(),
        mac,
    }
}

/// Form-encode and POST the order. Transport failures surface directly; the
/// caller maps them to a 400 at the boundary.
pub async fn create_order(
    client: &reqwest::Client,
    config: &ZaloPayConfig,
    amount: i64,
    app_user: &str,
    bank_code: &str,
) -> Result<Value, DomainError> {
    let now = chrono::Local::now();
    let trans_id = rand::thread_rng().gen_range(0..1_000_000);
    let order = build_order(
        config,
        amount,
        app_user,
        bank_code,
        now.date_naive(),
        trans_id,
        now.timestamp_millis(),
    );

    tracing::info!(app_trans_id = %order.app_trans_id, amount, "creating payment order");

    let response = client
        .post(&config.endpoint)
        .form(&order)
        .send()
        .await
        .map_err(|e| DomainError::Gateway(e.to_string()))?;

    response
        .json::<Value>()
        .await
        .map_err(|e| DomainError::Gateway(e.to_string()))
}
