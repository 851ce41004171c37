pub const API_SUFFIX: &str = ":1280/api/v3";

const SCHEME: &str = "https://";

/// Turns a user-entered host into the portal API base URL.
///
/// The host is not validated. Garbage in produces a URL that fails when the
/// first request is sent.
pub fn format_url(raw: &str) -> String {
    let mut url = if raw.starts_with(SCHEME) {
        raw.to_string()
    } else {
        format!("{SCHEME}{raw}")
    };
    if !url.ends_with(API_SUFFIX) {
        if url.ends_with('/') {
            url.pop();
        }
        if let Some(stripped) = url.strip_suffix(API_SUFFIX) {
            url = stripped.to_string();
        }
        url.push_str(API_SUFFIX);
    }
    url
}
