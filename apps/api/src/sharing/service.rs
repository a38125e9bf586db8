use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::email::{Invitation, InvitationSender};
use crate::errors::AppError;
use crate::interviews::service::{get_interview, normalize_emails};

#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    pub emails: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryFailure {
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareReport {
    pub sent: usize,
    pub total: usize,
    pub summary: String,
    pub failures: Vec<DeliveryFailure>,
}

pub fn default_message(interview_link: &str) -> String {
    format!("Check out this interview: {interview_link}")
}

pub fn build_invitations(
    emails: &[String],
    message: Option<&str>,
    interview_link: &str,
) -> Result<Vec<Invitation>, AppError> {
    let recipients = normalize_emails(emails);
    if recipients.is_empty() {
        return Err(AppError::Validation(
            "At least one recipient email is required".to_string(),
        ));
    }

    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_message(interview_link));

    Ok(recipients
        .into_iter()
        .map(|email| Invitation {
            email,
            message: message.clone(),
            interview_link: interview_link.to_string(),
        })
        .collect())
}

/// Sends every invitation concurrently. Individual failures are reported, not raised.
pub async fn deliver(mailer: Arc<dyn InvitationSender>, invitations: Vec<Invitation>) -> ShareReport {
    let total = invitations.len();

    let handles: Vec<_> = invitations
        .into_iter()
        .map(|invitation| {
            let mailer = Arc::clone(&mailer);
            let email = invitation.email.clone();
            let handle = tokio::spawn(async move { mailer.send_invitation(&invitation).await });
            (email, handle)
        })
        .collect();

    let mut sent = 0;
    let mut failures = Vec::new();
    for (email, handle) in handles {
        let error = match handle.await {
            Ok(Ok(())) => {
                sent += 1;
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("delivery task failed: {e}"),
        };
        warn!("Invitation to {email} failed: {error}");
        failures.push(DeliveryFailure { email, error });
    }

    ShareReport {
        sent,
        total,
        summary: format!("Sent {sent} out of {total} emails successfully."),
        failures,
    }
}

pub async fn send_invitations(
    pool: &PgPool,
    mailer: Arc<dyn InvitationSender>,
    base_url: &str,
    interview_id: &str,
    request: &ShareRequest,
) -> Result<ShareReport, AppError> {
    let interview = get_interview(pool, interview_id).await?;
    let interview_link = interview
        .url
        .clone()
        .unwrap_or_else(|| format!("{base_url}/call/{}", interview.id));

    let invitations = build_invitations(&request.emails, request.message.as_deref(), &interview_link)?;
    let report = deliver(mailer, invitations).await;

    info!("Interview {interview_id} shared: {}", report.summary);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const LINK: &str = "https://app.example.com/call/abc";

    #[derive(Default)]
    struct RecordingSender {
        delivered: Mutex<Vec<Invitation>>,
    }

    #[async_trait]
    impl InvitationSender for RecordingSender {
        async fn send_invitation(&self, invitation: &Invitation) -> Result<(), AppError> {
            if invitation.email.contains("bounce") {
                return Err(AppError::Email("mailbox unavailable".to_string()));
            }
            self.delivered.lock().unwrap().push(invitation.clone());
            Ok(())
        }
    }

    fn emails(list: &[&str]) -> Vec<String> {
        list.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_empty_recipients_rejected() {
        let err = build_invitations(&emails(&["  ", ""]), None, LINK).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_default_message_uses_link() {
        let invitations = build_invitations(&emails(&["Ada@Example.com"]), None, LINK).unwrap();
        assert_eq!(invitations.len(), 1);
        assert_eq!(invitations[0].email, "ada@example.com");
        assert_eq!(
            invitations[0].message,
            "Check out this interview: https://app.example.com/call/abc"
        );
        assert_eq!(invitations[0].interview_link, LINK);
    }

    #[test]
    fn test_custom_message_and_dedup() {
        let invitations = build_invitations(
            &emails(&["a@x.io", "A@x.io ", "b@x.io"]),
            Some("Please join us"),
            LINK,
        )
        .unwrap();
        assert_eq!(invitations.len(), 2);
        assert!(invitations.iter().all(|i| i.message == "Please join us"));
    }

    #[tokio::test]
    async fn test_partial_failure_reported() {
        let sender = Arc::new(RecordingSender::default());
        let invitations =
            build_invitations(&emails(&["a@x.io", "bounce@x.io", "c@x.io"]), None, LINK).unwrap();

        let report = deliver(sender.clone(), invitations).await;

        assert_eq!(report.sent, 2);
        assert_eq!(report.total, 3);
        assert_eq!(report.summary, "Sent 2 out of 3 emails successfully.");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].email, "bounce@x.io");
        assert_eq!(sender.delivered.lock().unwrap().len(), 2);
    }
}
