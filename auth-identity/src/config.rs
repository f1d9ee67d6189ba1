use std::path::PathBuf;

pub const DEFAULT_USERS_FILE: &str = "users.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub users_file: PathBuf,
    pub password_min_length: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            password_min_length: 8,
        }
    }
}

impl IdentityConfig {
    /// Load identity configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("AISCRIBE_USERS_FILE") {
            config.users_file = PathBuf::from(path);
        }
        if let Some(min) = std::env::var("AISCRIBE_PASSWORD_MIN_LENGTH")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.password_min_length = min;
        }
        config
    }
}
