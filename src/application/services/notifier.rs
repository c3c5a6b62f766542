//! # Degrade Notifications
//!
//! User-facing warning raised when the aggregator falls back to synthetic
//! offers.
//!
//! A total provider failure is not an error: the caller still receives
//! offers. The [`DegradeNotifier`] is told once per degraded search so the
//! surface in front of the user can show a warning.

use crate::infrastructure::providers::transport::TransportMode;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

/// Why the aggregator degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    /// Direct connection to the provider failed.
    DirectConnectionFailed,
    /// The provider could not be reached even through the proxy.
    ProxyFailed,
}

impl DegradeReason {
    /// Reason matching the transport in use.
    #[must_use]
    pub fn for_mode(mode: TransportMode) -> Self {
        match mode {
            TransportMode::Direct => Self::DirectConnectionFailed,
            TransportMode::Proxy => Self::ProxyFailed,
        }
    }

    /// Message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DirectConnectionFailed => {
                "Could not connect to the insurance provider. Showing example offers."
            }
            Self::ProxyFailed => {
                "Could not reach the insurance provider, even through the proxy. Showing example offers."
            }
        }
    }
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectConnectionFailed => write!(f, "direct connection failed"),
            Self::ProxyFailed => write!(f, "failed even through proxy"),
        }
    }
}

/// Details of one degraded search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradeNotice {
    /// Why the search degraded.
    pub reason: DegradeReason,
    /// Requests attempted, excluding authentication.
    pub attempts: usize,
    /// Last failure observed.
    pub last_error: Option<String>,
    /// Number of placeholder offers returned.
    pub offers_returned: usize,
}

impl DegradeNotice {
    /// Message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        self.reason.user_message()
    }
}

/// Receives degrade notices.
pub trait DegradeNotifier: Send + Sync + fmt::Debug {
    /// Called exactly once per degraded search.
    fn notify(&self, notice: &DegradeNotice);
}

/// Notifier that emits a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl DegradeNotifier for TracingNotifier {
    fn notify(&self, notice: &DegradeNotice) {
        tracing::warn!(
            reason = %notice.reason,
            attempts = notice.attempts,
            last_error = notice.last_error.as_deref().unwrap_or("none"),
            offers = notice.offers_returned,
            "{}",
            notice.user_message()
        );
    }
}

/// Notifier that keeps every notice in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<DegradeNotice>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notices received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<DegradeNotice> {
        self.notices.lock().clone()
    }

    /// Returns the number of notices received.
    #[must_use]
    pub fn count(&self) -> usize {
        self.notices.lock().len()
    }
}

impl DegradeNotifier for RecordingNotifier {
    fn notify(&self, notice: &DegradeNotice) {
        self.notices.lock().push(notice.clone());
    }
}
