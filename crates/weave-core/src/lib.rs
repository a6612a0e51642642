//! Foundational low-level utilities shared across Weave crates.
//!
//! Provides wall-clock helpers used by health reporting and request timing,
//! plus string normalization for credentials read from the environment.

pub mod text_utils;
pub mod time_utils;

pub use text_utils::non_empty_trimmed;
pub use time_utils::{current_iso8601_timestamp, current_unix_timestamp_ms, elapsed_ms_since};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_utils_elapsed_never_underflows() {
        let now_ms = current_unix_timestamp_ms();
        assert_eq!(elapsed_ms_since(now_ms.saturating_add(10_000)), 0);
        assert!(elapsed_ms_since(now_ms.saturating_sub(5)) >= 5);
    }

    #[test]
    fn iso8601_timestamp_uses_utc_millisecond_precision() {
        let stamp = current_iso8601_timestamp();
        assert!(stamp.ends_with('Z'), "{stamp}");
        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).expect("parse rfc3339");
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        let fraction = stamp
            .rsplit_once('.')
            .map(|(_, tail)| tail.trim_end_matches('Z'))
            .expect("fractional seconds");
        assert_eq!(fraction.len(), 3);
    }

    #[test]
    fn non_empty_trimmed_drops_blank_values() {
        assert_eq!(non_empty_trimmed(None), None);
        assert_eq!(non_empty_trimmed(Some("   ")), None);
        assert_eq!(non_empty_trimmed(Some(" ghp_abc ")), Some("ghp_abc".to_string()));
    }
}
