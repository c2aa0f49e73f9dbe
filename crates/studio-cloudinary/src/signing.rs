//! Request signing.
//!
//! The signature is the hex digest of the sorted `key=value` pairs joined with `&`,
//! followed directly by the API secret. SHA-1 unless the account verifies SHA-256, in
//! which case `signature_algorithm=sha256` travels with the request. Empty values and
//! the transport fields (`file`, `cloud_name`, `resource_type`, `api_key`, `signature`,
//! `signature_algorithm`) are not signed.

use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use studio_core::SignatureAlgorithm;

const UNSIGNED_PARAMS: &[&str] = &[
    "file",
    "cloud_name",
    "resource_type",
    "api_key",
    "signature",
    "signature_algorithm",
];

/// The string that gets hashed, without the secret.
pub fn string_to_sign(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(key, value)| !value.is_empty() && !UNSIGNED_PARAMS.contains(&key.as_str()))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

fn digest<D: Digest>(payload: &str, api_secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn sign_params(
    params: &BTreeMap<String, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let payload = string_to_sign(params);
    match algorithm {
        SignatureAlgorithm::Sha1 => digest::<Sha1>(&payload, api_secret),
        SignatureAlgorithm::Sha256 => digest::<Sha256>(&payload, api_secret),
    }
}

/// Add `timestamp`, `api_key` and `signature` to a parameter set.
pub(crate) fn signed(
    mut params: BTreeMap<String, String>,
    api_key: &str,
    api_secret: &str,
    timestamp: i64,
    algorithm: SignatureAlgorithm,
) -> BTreeMap<String, String> {
    params.retain(|_, value| !value.is_empty());
    params.insert("timestamp".to_string(), timestamp.to_string());
    let signature = sign_params(&params, api_secret, algorithm);
    params.insert("api_key".to_string(), api_key.to_string());
    params.insert("signature".to_string(), signature);
    if algorithm != SignatureAlgorithm::Sha1 {
        params.insert(
            "signature_algorithm".to_string(),
            algorithm.as_str().to_string(),
        );
    }
    params
}
