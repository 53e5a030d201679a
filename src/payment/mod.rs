//! Payment gateway adapters.
//!
//! Both adapters are pure request builders: (credentials, order parameters)
//! in, signed payload out. Credentials live in [`crate::config::Config`] and
//! are injected per call, never held in module state. No retries: a failed
//! gateway call is reported to the caller as-is.

pub mod momo;
pub mod zalopay;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 over the canonical string, the signature scheme
/// shared by both gateways.
pub fn hmac_sha256_hex(secret: &str, data: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
