//! Classify fetch errors into retryable vs fatal.
//!
//! The mapping is total: every `FetchError` lands in exactly one class.

use super::error::FetchError;

/// Retry-relevant classification of a fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient; worth retrying within the backoff budget.
    Retryable,
    /// Retrying will not help; abort the tick immediately.
    Fatal,
}

/// Classify an HTTP status code.
///
/// 429 and the transient 5xx family are retryable; any other non-2xx status
/// means the request itself is bad (auth, routing, contract) and retrying
/// would just burn budget.
pub fn classify_status(code: u32) -> ErrorClass {
    match code {
        429 | 500 | 502 | 503 | 504 => ErrorClass::Retryable,
        _ => ErrorClass::Fatal,
    }
}

/// Classify a curl error.
///
/// Timeouts and connection-level failures are retryable; anything else
/// (bad URL, TLS misconfiguration, ...) is treated as fatal.
pub fn classify_curl_error(e: &curl::Error) -> ErrorClass {
    if e.is_operation_timedout()
        || e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorClass::Retryable;
    }
    ErrorClass::Fatal
}

/// Classify a fetch error into an ErrorClass.
pub fn classify(e: &FetchError) -> ErrorClass {
    match e {
        FetchError::Transport(ce) => classify_curl_error(ce),
        FetchError::Status(code) => classify_status(*code),
        FetchError::Malformed(_) | FetchError::Unexpected(_) => ErrorClass::Fatal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_transient_5xx_retryable() {
        for code in [429, 500, 502, 503, 504] {
            assert_eq!(classify_status(code), ErrorClass::Retryable, "{}", code);
        }
    }

    #[test]
    fn client_errors_fatal() {
        for code in [400, 401, 403, 404, 422] {
            assert_eq!(classify_status(code), ErrorClass::Fatal, "{}", code);
        }
    }

    #[test]
    fn uncommon_5xx_fatal() {
        // Only the transient subset of 5xx is retried.
        assert_eq!(classify_status(501), ErrorClass::Fatal);
        assert_eq!(classify_status(505), ErrorClass::Fatal);
    }

    #[test]
    fn curl_timeout_and_connect_retryable() {
        // CURLE_OPERATION_TIMEDOUT
        assert_eq!(classify_curl_error(&curl::Error::new(28)), ErrorClass::Retryable);
        // CURLE_COULDNT_CONNECT
        assert_eq!(classify_curl_error(&curl::Error::new(7)), ErrorClass::Retryable);
        // CURLE_COULDNT_RESOLVE_HOST
        assert_eq!(classify_curl_error(&curl::Error::new(6)), ErrorClass::Retryable);
    }

    #[test]
    fn curl_url_malformed_fatal() {
        // CURLE_URL_MALFORMAT
        assert_eq!(classify_curl_error(&curl::Error::new(3)), ErrorClass::Fatal);
    }

    #[test]
    fn payload_and_unexpected_errors_fatal() {
        let malformed = FetchError::Malformed("price missing".into());
        let unexpected = FetchError::Unexpected("task panicked".into());
        assert_eq!(classify(&malformed), ErrorClass::Fatal);
        assert_eq!(classify(&unexpected), ErrorClass::Fatal);
    }

    #[test]
    fn classification_is_total_over_known_failures() {
        let cases: Vec<FetchError> = vec![
            FetchError::Transport(curl::Error::new(7)),  // connection refused
            FetchError::Transport(curl::Error::new(28)), // timeout
            FetchError::Status(429),
            FetchError::Status(500),
            FetchError::Status(502),
            FetchError::Status(503),
            FetchError::Status(504),
            FetchError::Status(404),
            FetchError::Status(401),
            FetchError::Malformed("invalid JSON".into()),
            FetchError::Malformed("price missing".into()),
            FetchError::Unexpected("boom".into()),
        ];
        for e in &cases {
            // Every failure maps to exactly one of the two classes.
            match classify(e) {
                ErrorClass::Retryable | ErrorClass::Fatal => {}
            }
        }
    }
}
