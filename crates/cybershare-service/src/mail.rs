//! Outbound mail.
//!
//! The platform only sends password reset links. Production deployments use
//! [`SmtpMailer`]; `mail.driver = "log"` swaps in [`LogMailer`], which drops
//! the message and records only who it was for.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use cybershare_core::AppError;
use cybershare_core::config::{MailConfig, MailDriver, SmtpTls};
use cybershare_core::result::AppResult;

/// A sender of transactional email.
#[async_trait]
pub trait Mailer: Send + Sync + fmt::Debug {
    /// Send a plain-text message.
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Build the mailer selected by `mail.driver`.
pub fn build_mailer(config: &MailConfig) -> AppResult<Arc<dyn Mailer>> {
    match config.driver {
        MailDriver::Smtp => Ok(Arc::new(SmtpMailer::new(config)?)),
        MailDriver::Log => {
            warn!("Mail delivery is disabled (mail.driver = \"log\")");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Delivers mail through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    relay: String,
}

impl SmtpMailer {
    /// Prepare the transport. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let smtp = &config.smtp;
        let from = format!("{} <{}>", config.app_name, config.from_address)
            .parse::<Mailbox>()
            .map_err(|e| AppError::configuration(format!("Invalid mail.from_address: {e}")))?;

        let mut builder = match smtp.tls {
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host),
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                .map_err(|e| AppError::configuration(format!("Invalid SMTP relay: {e}")))?,
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                .map_err(|e| AppError::configuration(format!("Invalid SMTP relay: {e}")))?,
        };
        builder = builder
            .port(smtp.port)
            .timeout(Some(Duration::from_secs(smtp.timeout_seconds)));
        if !smtp.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ));
        }

        info!(host = %smtp.host, port = smtp.port, tls = ?smtp.tls, "SMTP mailer configured");
        Ok(Self {
            transport: builder.build(),
            from,
            relay: format!("{}:{}", smtp.host, smtp.port),
        })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::validation(format!("Invalid recipient address: {e}")))?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::internal(format!("Failed to build message: {e}")))
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("relay", &self.relay)
            .field("from", &self.from.to_string())
            .finish()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let message = self.build_message(to, subject, body)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::external(format!("SMTP delivery via {} failed: {e}", self.relay)))?;
        debug!(relay = %self.relay, subject = %subject, "Mail delivered");
        Ok(())
    }
}

/// Drops outgoing mail. Only the subject is recorded; bodies carry secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, _to: &str, subject: &str, _body: &str) -> AppResult<()> {
        warn!(subject = %subject, "Mail delivery disabled, message dropped");
        Ok(())
    }
}

/// Subject and body of the password reset message.
pub fn password_reset_message(
    app_name: &str,
    display_name: &str,
    link: &str,
    ttl_hours: i64,
) -> (String, String) {
    let subject = format!("{app_name}: reset your password");
    let body = format!(
        "Hello {display_name},\n\n\
         We received a request to reset your {app_name} password.\n\
         Open the link below to choose a new one:\n\n{link}\n\n\
         The link expires in {ttl_hours} hours. If you did not ask for this, ignore this email."
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_config() -> MailConfig {
        let mut config = MailConfig::default();
        config.smtp.host = "127.0.0.1".into();
        config.smtp.port = 1025;
        config.smtp.tls = SmtpTls::None;
        config
    }

    #[test]
    fn test_reset_message_contains_link() {
        let (subject, body) =
            password_reset_message("CyberShare", "Ana", "http://x/reset-password?token=abc", 24);
        assert!(subject.contains("CyberShare"));
        assert!(body.contains("token=abc"));
        assert!(body.contains("24 hours"));
    }

    #[tokio::test]
    async fn test_smtp_message_has_sender_and_recipient() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        let message = mailer
            .build_message("ana@example.com", "Reset", "hello")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: ana@example.com"));
        assert!(raw.contains("noreply@cybershare.local"));
        assert!(raw.contains("Subject: Reset"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_rejected() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        let err = mailer.build_message("not an address", "s", "b").unwrap_err();
        assert_eq!(err.kind, cybershare_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_invalid_sender_fails_configuration() {
        let mut config = smtp_config();
        config.from_address = "nope".into();
        let err = SmtpMailer::new(&config).unwrap_err();
        assert_eq!(err.kind, cybershare_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_unreachable_relay_reports_error() {
        let mut config = smtp_config();
        config.smtp.port = 1;
        config.smtp.timeout_seconds = 2;
        let mailer = SmtpMailer::new(&config).unwrap();
        let err = mailer.send("ana@example.com", "s", "b").await.unwrap_err();
        assert_eq!(err.kind, cybershare_core::error::ErrorKind::ExternalService);
    }

    #[tokio::test]
    async fn test_log_driver_drops_mail() {
        let mut config = MailConfig::default();
        config.driver = MailDriver::Log;
        let mailer = build_mailer(&config).unwrap();
        mailer.send("a@b.c", "s", "secret-token").await.unwrap();
    }
}
