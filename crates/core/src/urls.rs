//! Public URL construction for stream subscriptions and saved outputs.

use crate::error::CoreError;

/// Path prefix of the per-stream WebSocket endpoint.
pub const STREAM_PATH: &str = "/ws/stream";

/// Split `scheme://host[:port]/path` into `(scheme, host[:port])`.
fn scheme_and_authority(url: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if scheme.is_empty() || authority.is_empty() {
        return None;
    }
    Some((scheme, authority))
}

/// WebSocket URL a client subscribes to for `stream_id`.
///
/// The host comes from the public output base when configured (`http`
/// becomes `ws`, anything else `wss`), otherwise from the request's `Host`
/// header over plain `ws`.
pub fn stream_ws_url(
    output_url_base: Option<&str>,
    request_host: Option<&str>,
    stream_id: &str,
) -> Result<String, CoreError> {
    if let Some((scheme, authority)) = output_url_base.and_then(scheme_and_authority) {
        let ws_scheme = if scheme.eq_ignore_ascii_case("http") { "ws" } else { "wss" };
        return Ok(format!("{ws_scheme}://{authority}{STREAM_PATH}/{stream_id}"));
    }
    match request_host.filter(|h| !h.is_empty()) {
        Some(host) => Ok(format!("ws://{host}{STREAM_PATH}/{stream_id}")),
        None => Err(CoreError::Validation(
            "Cannot build a stream URL: OUTPUT_URL_BASE is not configured and the request has no Host header"
                .to_string(),
        )),
    }
}

/// Public URL of a saved output file.
pub fn public_output_url(output_url_base: &str, filename: &str) -> String {
    format!("{}/{}", output_url_base.trim_end_matches('/'), filename)
}

/// Reduce a backend-provided name to a bare file name safe to write.
///
/// Directory components are dropped and anything outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_output_filename(name: &str) -> Result<String, CoreError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        return Err(CoreError::Validation(format!("Unusable output file name: '{name}'")));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_follows_output_base_scheme() {
        let url = stream_ws_url(Some("http://images.local:8000/outputs"), None, "abc").unwrap();
        assert_eq!(url, "ws://images.local:8000/ws/stream/abc");

        let url = stream_ws_url(Some("https://img.example.com/outputs"), Some("ignored"), "abc").unwrap();
        assert_eq!(url, "wss://img.example.com/ws/stream/abc");
    }

    #[test]
    fn ws_url_falls_back_to_request_host() {
        let url = stream_ws_url(None, Some("127.0.0.1:8000"), "s1").unwrap();
        assert_eq!(url, "ws://127.0.0.1:8000/ws/stream/s1");

        let url = stream_ws_url(Some("not a url"), Some("localhost"), "s1").unwrap();
        assert_eq!(url, "ws://localhost/ws/stream/s1");
    }

    #[test]
    fn ws_url_without_any_host_fails() {
        assert!(stream_ws_url(None, None, "s1").is_err());
    }

    #[test]
    fn output_url_joins_without_double_slash() {
        assert_eq!(
            public_output_url("http://host/outputs/", "img_001.png"),
            "http://host/outputs/img_001.png"
        );
    }

    #[test]
    fn output_names_are_flattened() {
        assert_eq!(sanitize_output_filename("sub/dir/ComfyUI_0001_.png").unwrap(), "ComfyUI_0001_.png");
        assert_eq!(sanitize_output_filename("..\\evil name.png").unwrap(), "evil_name.png");
        assert!(sanitize_output_filename("../..").is_err());
    }
}
