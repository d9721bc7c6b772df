//! Outbound mail configuration.

use serde::{Deserialize, Serialize};

/// How outbound mail leaves the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailDriver {
    /// Deliver through the SMTP relay in `[mail.smtp]`.
    #[default]
    Smtp,
    /// Drop messages, recording only recipient and subject.
    Log,
}

/// Sender identity and transport for transactional mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub driver: MailDriver,
    /// `From` address.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Product name used in subjects, greetings and the `From` display name.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            driver: MailDriver::default(),
            from_address: default_from(),
            app_name: default_app_name(),
            smtp: SmtpConfig::default(),
        }
    }
}

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Plain connection, for local relays such as MailHog.
    None,
    /// Upgrade with STARTTLS (usually port 587).
    #[default]
    StartTls,
    /// Implicit TLS (usually port 465).
    Tls,
}

/// `[mail.smtp]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Empty means the relay accepts unauthenticated mail.
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub tls: SmtpTls,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            tls: SmtpTls::default(),
            timeout_seconds: default_smtp_timeout(),
        }
    }
}

fn default_from() -> String {
    "noreply@cybershare.local".to_string()
}

fn default_app_name() -> String {
    "CyberShare".to_string()
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_section_parses() {
        let config: MailConfig = serde_json::from_str(
            r#"{"driver":"smtp","smtp":{"host":"mail.example.com","port":465,"tls":"tls","username":"u","password":"p"}}"#,
        )
        .unwrap();
        assert_eq!(config.driver, MailDriver::Smtp);
        assert_eq!(config.smtp.host, "mail.example.com");
        assert_eq!(config.smtp.tls, SmtpTls::Tls);
        assert_eq!(config.from_address, "noreply@cybershare.local");
    }

    #[test]
    fn test_password_is_never_serialized() {
        let mut config = MailConfig::default();
        config.smtp.password = "hunter2".into();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
