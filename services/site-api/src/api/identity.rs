use axum::http::HeaderMap;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const CF_CONNECTING_IP_HEADER: &str = "cf-connecting-ip";

/// Resolves the caller's address from proxy headers.
///
/// `x-forwarded-for` wins when present; its first hop is the client. Blank
/// values are treated as absent.
pub fn client_identity(headers: &HeaderMap) -> Option<String> {
    header_value(headers, FORWARDED_FOR_HEADER)
        .and_then(|value| value.split(',').next().map(str::trim).map(str::to_string))
        .filter(|value| !value.is_empty())
        .or_else(|| header_value(headers, CF_CONNECTING_IP_HEADER).map(str::to_string))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
