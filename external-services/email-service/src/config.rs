use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_IMAP_SERVER: &str = "imap.gmail.com";
pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_FROM_NAME: &str = "AIscribe Medical Team";

/// Email service configuration
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    /// Login name, also the sender and Reply-To address
    pub username: String,
    pub password: SecretString,
    pub from_name: String,
    pub email_enabled: bool,
    /// IMAP host for patient replies, implicit TLS
    pub imap_server: String,
    pub imap_port: u16,
    /// Folder of raw `.eml` messages read instead of IMAP when set
    pub inbox_dir: Option<PathBuf>,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("imap_server", &self.imap_server)
            .field("imap_port", &self.imap_port)
            .field("from_name", &self.from_name)
            .field("email_enabled", &self.email_enabled)
            .field("inbox_dir", &self.inbox_dir)
            .finish_non_exhaustive()
    }
}

impl EmailConfig {
    /// Load email configuration from environment variables
    pub fn from_env() -> Self {
        let username = std::env::var("EMAIL_USERNAME").unwrap_or_default();

        // Sending without credentials can never succeed
        let email_enabled = std::env::var("EMAIL_ENABLED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(!username.is_empty());

        Self {
            smtp_server: std::env::var("EMAIL_SMTP_SERVER")
                .unwrap_or_else(|_| DEFAULT_SMTP_SERVER.to_string()),
            smtp_port: std::env::var("EMAIL_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            password: SecretString::new(std::env::var("EMAIL_PASSWORD").unwrap_or_default()),
            from_name: std::env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| DEFAULT_FROM_NAME.to_string()),
            imap_server: std::env::var("EMAIL_IMAP_SERVER")
                .unwrap_or_else(|_| DEFAULT_IMAP_SERVER.to_string()),
            imap_port: std::env::var("EMAIL_IMAP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_IMAP_PORT),
            inbox_dir: std::env::var("EMAIL_INBOX_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            username,
            email_enabled,
        }
    }

    pub fn from_email(&self) -> &str {
        &self.username
    }
}
