//! MoMo-style gateway adapter.
//!
//! The canonical string concatenates key=value pairs in a fixed order and
//! the hex HMAC-SHA256 digest rides along as `signature` in the JSON body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MomoConfig;
use crate::domain::DomainError;

use super::hmac_sha256_hex;

pub const REQUEST_TYPE: &str = "payWithATM";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoOrder {
    pub partner_code: String,
    pub access_key: String,
    pub request_id: String,
    pub amount: String,
    pub order_id: String,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub extra_data: String,
    pub request_type: String,
    pub signature: String,
    pub lang: String,
}

/// Canonical query string signed by the gateway. The key order is part of
/// the protocol and must not change.
#[allow(clippy::too_many_arguments)]
pub fn raw_signature(
    access_key: &str,
    amount: &str,
    extra_data: &str,
    ipn_url: &str,
    order_id: &str,
    order_info: &str,
    partner_code: &str,
    redirect_url: &str,
    request_id: &str,
    request_type: &str,
) -> String {
    format!(
        "accessKey={}&amount={}&extraData={}&ipnUrl={}&orderId={}&orderInfo={}&partnerCode={}&redirectUrl={}&requestId={}&requestType={}",
        access_key,
        amount,
        extra_data,
        ipn_url,
        order_id,
        order_info,
        partner_code,
        redirect_url,
        request_id,
        request_type,
    )
}

/// Build the signed order payload. Request and order ids derive from the
/// millisecond timestamp, so uniqueness is only as fine as the clock; the
/// caller passes the timestamp to keep signatures reproducible under test.
pub fn build_order(
    config: &MomoConfig,
    amount: i64,
    order_info: &str,
    now_millis: i64,
) -> MomoOrder {
    let request_id = format!("{}{}", config.partner_code, now_millis);
    let order_id = format!("MM{}", now_millis);
    let amount = amount.to_string();
    let extra_data = String::new();

    let raw = raw_signature(
        &config.access_key,
        &amount,
        &extra_data,
        &config.ipn_url,
        &order_id,
        order_info,
        &config.partner_code,
        &config.redirect_url,
        &request_id,
        REQUEST_TYPE,
    );
    let signature = hmac_sha256_hex(&config.secret_key, &raw);

    MomoOrder {
        partner_code: config.partner_code.clone(),
        access_key: config.access_key.clone(),
        request_id,
        amount,
        order_id,
        order_info: order_info.to_string(),
        redirect_url: config.redirect_url.clone(),
        ipn_url: config.ipn_url.clone(),
        extra_data,
        request_type: REQUEST_TYPE.to_string(),
        signature,
        lang: "vi".to_string(),
    }
}

/// POST the signed order to the gateway. A non-200 answer is a gateway
/// error, not a local one.
pub async fn create_order(
    client: &reqwest::Client,
    config: &MomoConfig,
    amount: i64,
    order_info: &str,
) -> Result<Value, DomainError> {
    let order = build_order(config, amount, order_info, chrono::Utc::now().timestamp_millis());

    tracing::info!(order_id = %order.order_id, amount = %order.amount, "creating payment order");

    let response = client
        .post(&config.endpoint)
        .json(&order)
        .send()
        .await
        .map_err(|e| DomainError::Gateway(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DomainError::Gateway(format!(
            "failed to create payment request, status code: {}",
            response.status().as_u16()
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| DomainError::Gateway(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_fixed() {
        let raw = raw_signature(
            "ak", "1000", "", "https://ipn", "MM1", "info", "PC", "https://back", "PC1", "payWithATM",
        );
        assert_eq!(
            raw,
            "accessKey=ak&amount=1000&extraData=&ipnUrl=https://ipn&orderId=MM1&orderInfo=info&partnerCode=PC&redirectUrl=https://back&requestId=PC1&requestType=payWithATM"
        );
    }

    #[test]
    fn ids_derive_from_timestamp() {
        let config = MomoConfig {
            partner_code: "PC".to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            endpoint: "https://example.invalid".to_string(),
            redirect_url: "https://back".to_string(),
            ipn_url: "https://ipn".to_string(),
        };
        let order = build_order(&config, 1000, "info", 1700000000000);
        assert_eq!(order.request_id, "PC1700000000000");
        assert_eq!(order.order_id, "MM1700000000000");
        assert_eq!(order.request_type, "payWithATM");
        assert_eq!(order.extra_data, "");
    }
}
