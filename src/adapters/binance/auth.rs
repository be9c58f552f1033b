//! Binance request signing
//!
//! Signed endpoints take an HMAC-SHA256 digest of the URL-encoded query
//! string, keyed with the API secret and appended as `signature=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::ports::ExchangeError;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `message` as a lowercase hex string
pub fn hmac_sha256_sign(secret: &str, message: &str) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Authentication(format!("Invalid API secret: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// URL-encode `params`, join with `&` and append the signature.
///
/// `params` must already contain `timestamp`.
pub fn build_signed_query(params: &[(&str, String)], secret: &str) -> Result<String, ExchangeError> {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let signature = hmac_sha256_sign(secret, &query)?;
    Ok(format!("{query}&signature={signature}"))
}
