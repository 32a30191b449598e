//! AWS Signature Version 4 request signing
//!
//! Produces the `Authorization`, `Host` and `X-Amz-Date` headers for a
//! control-plane request. Only the pieces the gateway client needs are
//! implemented: JSON payloads, no chunked signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// Service name used in the credential scope
const SERVICE: &str = "apigateway";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// One request's worth of signing input
pub struct SigningParams<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    /// Query parameters, unencoded
    pub query: &'a [(String, String)],
    pub payload: &'a [u8],
    pub region: &'a str,
    pub now: DateTime<Utc>,
}

/// Sign a request, returning the headers to attach (name, value)
pub fn sign(params: &SigningParams<'_>, credentials: &Credentials) -> Vec<(String, String)> {
    let amz_date = params.now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = params.now.format("%Y%m%d").to_string();

    let mut headers: Vec<(String, String)> = vec![
        ("host".to_string(), params.host.to_string()),
        ("x-amz-date".to_string(), amz_date.clone()),
    ];
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();
    let signed_headers: String = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        params.method,
        canonical_path(params.path),
        canonical_query(params.query),
        canonical_headers,
        signed_headers,
        hex::encode(Sha256::digest(params.payload)),
    );

    let scope = format!("{}/{}/{}/aws4_request", date_stamp, params.region, SERVICE);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes())),
    );

    let signing_key = derive_key(
        &credentials.secret_access_key,
        &date_stamp,
        params.region,
        SERVICE,
    );
    let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
    );

    headers.push(("authorization".to_string(), authorization));
    headers
}

/// Derive the per-day signing key via the HMAC chain
fn derive_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date_stamp.as_bytes());
    let k_region = hmac(&k_date, region.as_bytes());
    let k_service = hmac(&k_region, service.as_bytes());
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Encode a path, keeping segment separators intact
fn canonical_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Sorted, fully-encoded query string
pub(crate) fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986 percent-encoding with the unreserved set left bare
pub(crate) fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
