//! Redelivery suppression.
//!
//! Slack redelivers an event it considers unacknowledged and marks the attempt with
//! `X-Slack-Retry-Num` / `X-Slack-Retry-Reason`. Unless retries are allowed, those are acked
//! and dropped.

/// Retry reason Slack sends when our previous response was too slow.
pub const TIMEOUT_RETRY_REASON: &str = "http_timeout";

/// Out-of-band delivery metadata (from request headers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryMetadata {
    pub retry_count: Option<i64>,
    pub retry_reason: Option<String>,
}

impl DeliveryMetadata {
    /// Build from raw header values. A retry count that is present but not a number still
    /// marks a retry; a zero or negative count does not.
    pub fn from_headers(retry_num: Option<&str>, retry_reason: Option<&str>) -> Self {
        let retry_count = retry_num.map(str::trim).map(|raw| {
            raw.parse::<i64>().unwrap_or_else(|_| {
                log::debug!("unparseable retry count {:?}, treating as a retry", raw);
                1
            })
        });
        Self {
            retry_count,
            retry_reason: retry_reason.map(|r| r.trim().to_string()),
        }
    }

    pub fn is_retry(&self) -> bool {
        self.retry_reason.as_deref() == Some(TIMEOUT_RETRY_REASON)
            || self.retry_count.is_some_and(|n| n > 0)
    }
}

/// True when the delivery must be acknowledged without any processing.
pub fn should_suppress(metadata: &DeliveryMetadata, allow_retry: bool) -> bool {
    !allow_retry && metadata.is_retry()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_delivery_is_processed() {
        let m = DeliveryMetadata::from_headers(None, None);
        assert!(!should_suppress(&m, false));
        let m = DeliveryMetadata::from_headers(Some("0"), None);
        assert!(!should_suppress(&m, false));
    }

    #[test]
    fn retry_count_suppresses_unless_allowed() {
        let m = DeliveryMetadata::from_headers(Some("2"), Some("http_error"));
        assert!(should_suppress(&m, false));
        assert!(!should_suppress(&m, true));
    }

    #[test]
    fn timeout_reason_suppresses_even_without_count() {
        let m = DeliveryMetadata::from_headers(None, Some("http_timeout"));
        assert!(should_suppress(&m, false));
        assert!(!should_suppress(&m, true));
    }

    #[test]
    fn other_reason_with_zero_count_is_processed() {
        let m = DeliveryMetadata::from_headers(Some("0"), Some("http_error"));
        assert!(!should_suppress(&m, false));
    }

    #[test]
    fn negative_count_is_processed() {
        let m = DeliveryMetadata::from_headers(Some("-1"), None);
        assert_eq!(m.retry_count, Some(-1));
        assert!(!should_suppress(&m, false));
        let m = DeliveryMetadata::from_headers(Some("-1"), Some("http_timeout"));
        assert!(should_suppress(&m, false));
    }

    #[test]
    fn garbage_count_counts_as_retry() {
        let m = DeliveryMetadata::from_headers(Some("abc"), None);
        assert_eq!(m.retry_count, Some(1));
        assert!(should_suppress(&m, false));
    }
}
