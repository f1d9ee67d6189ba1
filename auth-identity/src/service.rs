use crate::{config::*, error::*, models::*, repository::*};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Local;
use logger_redacted::redacted_info;
use rand::rngs::OsRng;
use std::sync::Arc;
use tracing::debug;

pub struct IdentityService {
    user_repo: Arc<dyn UserRepository>,
    config: IdentityConfig,
    argon2: Argon2<'static>,
}

/// Emails are matched trimmed and case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl IdentityService {
    pub fn new(user_repo: Arc<dyn UserRepository>, config: IdentityConfig) -> Self {
        Self {
            user_repo,
            config,
            argon2: Argon2::default(),
        }
    }

    /// Service over the users file named in `config`
    pub fn from_config(config: &IdentityConfig) -> Self {
        let repo = Arc::new(FileUserRepository::new(config.users_file.clone()));
        Self::new(repo, config.clone())
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<UserProfile> {
        let email = normalize_email(&request.email);
        require("first_name", &request.first_name)?;
        require("last_name", &request.last_name)?;
        require("email", &email)?;
        require("password", &request.password)?;

        if !is_valid_email(&email) {
            return Err(IdentityError::InvalidEmail);
        }
        if request.password.chars().count() < self.config.password_min_length {
            return Err(IdentityError::WeakPassword(self.config.password_min_length));
        }

        let user = User {
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email,
            password_hash: self.hash_password(&request.password)?,
            newsletter: request.newsletter,
            created_at: Local::now(),
        };
        let profile = UserProfile::from(&user);

        self.user_repo.create_user(user).await?;
        redacted_info!("User registered: {}", profile.email);
        Ok(profile)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let email = normalize_email(email);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        self.verify_password(password, &user.password_hash)?;

        redacted_info!("User logged in: {}", user.email);
        Ok(UserProfile::from(&user))
    }

    pub async fn get_user(&self, email: &str) -> Result<Option<UserProfile>> {
        let user = self.user_repo.find_by_email(&normalize_email(email)).await?;
        Ok(user.as_ref().map(UserProfile::from))
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| IdentityError::HashingError)?
            .to_string();
        Ok(password_hash)
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<()> {
        // An unreadable stored hash is reported like a wrong password
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            debug!(error = %e, "Stored password hash is not a PHC string");
            IdentityError::InvalidCredentials
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| IdentityError::InvalidCredentials)
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(IdentityError::MissingField(field))
    } else {
        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}
