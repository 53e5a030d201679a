use std::env;

/// MoMo-style gateway credentials. Secrets only ever come from the
/// environment.
#[derive(Clone)]
pub struct MomoConfig {
    pub partner_code: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub redirect_url: String,
    pub ipn_url: String,
}

/// ZaloPay-style gateway credentials.
#[derive(Clone)]
pub struct ZaloPayConfig {
    pub app_id: i64,
    pub key1: String,
    pub endpoint: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub momo: Option<MomoConfig>,
    pub zalopay: Option<ZaloPayConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://libris.db?mode=rwc".to_string());

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            momo: momo_from_env(),
            zalopay: zalopay_from_env(),
        }
    }
}

fn momo_from_env() -> Option<MomoConfig> {
    let partner_code = env::var("MOMO_PARTNER_CODE").ok()?;
    let access_key = env::var("MOMO_ACCESS_KEY").ok()?;
    let secret_key = env::var("MOMO_SECRET_KEY").ok()?;

    Some(MomoConfig {
        partner_code,
        access_key,
        secret_key,
        endpoint: env::var("MOMO_ENDPOINT").unwrap_or_else(|_| {
            "https://test-payment.momo.vn/v2/gateway/api/create".to_string()
        }),
        redirect_url: env::var("MOMO_REDIRECT_URL")
            .unwrap_or_else(|_| "https://momo.vn/return".to_string()),
        ipn_url: env::var("MOMO_IPN_URL")
            .unwrap_or_else(|_| "https://callback.url/notify".to_string()),
    })
}

fn zalopay_from_env() -> Option<ZaloPayConfig> {
    let app_id = env::var("ZALOPAY_APP_ID").ok()?.parse().ok()?;
    let key1 = env::var("ZALOPAY_KEY1").ok()?;

    Some(ZaloPayConfig {
        app_id,
        key1,
        endpoint: env::var("ZALOPAY_ENDPOINT")
            .unwrap_or_else(|_| "https://sb-openapi.zalopay.vn/v2/create".to_string()),
    })
}
