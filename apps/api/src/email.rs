//! Interview invitation emails.

use std::path::Path;

use askama::Template;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;

use crate::config::{EmailConfig, EmailTransportConfig};
use crate::errors::AppError;

const INVITATION_SUBJECT: &str = "You're invited to an interview";

/// One invitation: recipient, recruiter message and the candidate link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invitation {
    pub email: String,
    pub message: String,
    pub interview_link: String,
}

/// Delivers invitations. `EmailService` is the production sender.
#[async_trait]
pub trait InvitationSender: Send + Sync {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), AppError>;
}

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self, AppError> {
        let transport = match &config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
            } => {
                let smtp = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| AppError::Email(format!("create SMTP transport: {e}")))?
                    .port(*port)
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .build();
                EmailTransport::Smtp(smtp)
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir)
                        .map_err(|e| AppError::Email(format!("create emails directory: {e}")))?;
                }
                tracing::warn!("Email file transport active; invitations are written to {path}");
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    async fn send_email(&self, to_email: &str, subject: &str, body: String) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.from_name, self.from_email)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Email(format!("parse from email: {e}")))?;
        let to = to_email
            .parse::<Mailbox>()
            .map_err(|e| AppError::Validation(format!("Invalid recipient '{to_email}': {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| AppError::Email(format!("build email message: {e}")))?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| AppError::Email(format!("send SMTP email: {e}")))?;
            }
            EmailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| AppError::Email(format!("send file email: {e}")))?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl InvitationSender for EmailService {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), AppError> {
        let body = invitation_body(&invitation.message, &invitation.interview_link)?;
        self.send_email(&invitation.email, INVITATION_SUBJECT, body).await
    }
}

#[derive(Template)]
#[template(path = "invitation.html")]
struct InvitationTemplate<'a> {
    message_lines: Vec<&'a str>,
    interview_link: &'a str,
}

/// Renders the invitation HTML. Message and link are escaped by the template.
pub fn invitation_body(message: &str, interview_link: &str) -> Result<String, AppError> {
    InvitationTemplate {
        message_lines: message.lines().collect(),
        interview_link,
    }
    .render()
    .map_err(|e| AppError::Email(format!("render invitation: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config(dir: &Path) -> EmailConfig {
        EmailConfig {
            from_email: "no-reply@hirevoice.local".to_string(),
            from_name: "HireVoice".to_string(),
            transport: EmailTransportConfig::File {
                path: dir.to_string_lossy().to_string(),
            },
        }
    }

    #[test]
    fn test_invitation_body_escapes_message() {
        let body = invitation_body(
            "Hi <b>there</b> & welcome\nSee you soon",
            "https://app.example.com/call/abc",
        )
        .unwrap();
        assert!(body.contains("Hi &lt;b&gt;there&lt;"));
        assert!(body.contains("&amp; welcome<br>See you soon"));
        assert!(!body.contains("<b>"));
        assert!(body.contains("app.example.com"));
    }

    #[test]
    fn test_invitation_body_escapes_link_attribute() {
        let body = invitation_body(
            "Hello",
            r#"https://x.io/call/abc"><script>alert(1)</script>"#,
        )
        .unwrap();
        assert!(!body.contains("<script>"));
        assert!(!body.contains(r#"abc">"#));
        assert!(body.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_file_transport_writes_email() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path())).unwrap();

        service
            .send_invitation(&Invitation {
                email: "candidate@example.com".to_string(),
                message: "Check out this interview".to_string(),
                interview_link: "https://app.example.com/call/abc".to_string(),
            })
            .await
            .unwrap();

        let written = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path())).unwrap();

        let err = service
            .send_invitation(&Invitation {
                email: "not-an-address".to_string(),
                message: String::new(),
                interview_link: "https://app.example.com/call/abc".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
