//! Alert delivery.
//!
//! [`dispatch`] never fails: delivery problems are logged and reported back as
//! [`DispatchOutcome::Failed`] so the caller decides whether they matter.

mod smtp;

pub use smtp::SmtpMailer;

use crate::error::DispatchError;
use crate::thresholds::Issue;
use async_trait::async_trait;

pub const ALERT_SUBJECT: &str = "Infrahealth Alert";

/// A fully formatted alert ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEmail {
    pub subject: String,
    pub body: String,
}

impl AlertEmail {
    /// One issue per line under the fixed subject.
    pub fn from_issues(issues: &[Issue]) -> Self {
        let body = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            subject: ALERT_SUBJECT.to_string(),
            body,
        }
    }
}

/// Delivers a single alert. Each call owns its session from connect to close.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &AlertEmail) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing crossed a threshold; the transport was not touched.
    Skipped,
    Sent { issues: usize },
    Failed { reason: String },
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }
}

pub async fn dispatch(issues: &[Issue], transport: &dyn MailTransport) -> DispatchOutcome {
    if issues.is_empty() {
        return DispatchOutcome::Skipped;
    }
    let email = AlertEmail::from_issues(issues);
    match transport.send(&email).await {
        Ok(()) => {
            tracing::info!(
                operation = "dispatch_alert",
                issues = issues.len(),
                body = %email.body,
                "Sent alert"
            );
            DispatchOutcome::Sent {
                issues: issues.len(),
            }
        }
        Err(e) => {
            tracing::error!(operation = "dispatch_alert", error = %e, "Failed to send alert");
            DispatchOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
