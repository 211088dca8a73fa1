//! Route handlers.
//!
//! Every response body is JSON; the gate middleware attaches the CORS
//! header afterwards, so handlers never deal with origins beyond echoing
//! them in bodies.

pub mod meta;
pub mod query;

/// Paths listed in the banner and 404 bodies, in documentation order.
pub const AVAILABLE_ENDPOINTS: &[&str] = &["/", "/health", "/api/query", "/test", "/debug"];

/// ISO-8601 UTC instant with millisecond precision (JavaScript
/// `toISOString` shape), generated at response time.
pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::now_iso;

    #[test]
    fn timestamps_are_utc_with_millis() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'), "expected Z suffix, got {ts}");
        // 2026-08-30T12:34:56.789Z
        assert_eq!(ts.len(), 24, "unexpected timestamp shape: {ts}");
    }
}
