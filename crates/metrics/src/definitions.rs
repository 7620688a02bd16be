//! Metric names and label keys.

/// HTTP requests served by the gateway.
pub mod http {
    pub const REQUESTS_TOTAL: &str = "vocalis_http_requests_total";
    pub const REQUEST_DURATION_SECONDS: &str = "vocalis_http_request_duration_seconds";
    pub const REQUESTS_IN_FLIGHT: &str = "vocalis_http_requests_in_flight";
}

/// The preemption scan shared by every transport.
pub mod dispatch {
    /// Inbound messages run through the scan.
    pub const MESSAGES_TOTAL: &str = "vocalis_dispatch_messages_total";
    /// Scores computed, by capability. Capabilities after a winner are not
    /// scored, so this drops off along the registry order.
    pub const CAPABILITY_SCORED_TOTAL: &str = "vocalis_dispatch_capability_scored_total";
    /// Messages claimed, by winning capability.
    pub const PREEMPTIONS_TOTAL: &str = "vocalis_dispatch_preemptions_total";
    /// Messages no capability claimed.
    pub const UNMATCHED_TOTAL: &str = "vocalis_dispatch_unmatched_total";
    pub const INVOCATION_DURATION_SECONDS: &str =
        "vocalis_dispatch_invocation_duration_seconds";
    pub const INVOCATION_ERRORS_TOTAL: &str = "vocalis_dispatch_invocation_errors_total";
}

/// Telegram Bot API traffic.
pub mod telegram {
    /// Messages pushed, by kind (text, audio, photo).
    pub const MESSAGES_SENT_TOTAL: &str = "vocalis_telegram_messages_sent_total";
    pub const SEND_ERRORS_TOTAL: &str = "vocalis_telegram_send_errors_total";
    /// Webhook registrations, by outcome (registered, unchanged).
    pub const WEBHOOK_REGISTRATIONS_TOTAL: &str = "vocalis_telegram_webhook_registrations_total";
}

pub mod labels {
    pub const ENDPOINT: &str = "endpoint";
    pub const METHOD: &str = "method";
    pub const STATUS: &str = "status";
    pub const CAPABILITY: &str = "capability";
    pub const KIND: &str = "kind";
    pub const OUTCOME: &str = "outcome";
}

/// Histogram buckets, in seconds.
pub mod buckets {
    /// 1ms to 60s.
    pub const HTTP_DURATION: &[f64] = &[
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ];

    /// Capability backends (speech synthesis, model calls) run long: 50ms to
    /// 2 minutes.
    pub const INVOCATION_DURATION: &[f64] = &[
        0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0,
    ];
}
