//! Caller identity used to bucket anonymous requests for rate limiting.
//!
//! The identity is never used for authorization.

use actix_web::http::header::HeaderMap;

pub const FALLBACK_IDENTITY: &str = "0.0.0.0";

/// Returns the first non-empty candidate, in priority order:
/// first `x-forwarded-for` hop, then `x-real-ip`, then [`FALLBACK_IDENTITY`].
pub fn client_identity(headers: &HeaderMap) -> String {
    forwarded_for(headers)
        .or_else(|| real_ip(headers))
        .unwrap_or_else(|| FALLBACK_IDENTITY.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(String::from)
}

fn real_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-real-ip")
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
}
