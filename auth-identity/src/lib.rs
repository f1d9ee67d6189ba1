//! Identity management for AIscribe clinicians
//!
//! Accounts live in a single JSON file keyed by email address. Passwords are
//! stored as Argon2 PHC strings, and a failed login never reveals whether the
//! email or the password was wrong.
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_identity::{IdentityConfig, IdentityService, SignupRequest};
//!
//! # async fn example() -> Result<(), auth_identity::IdentityError> {
//! let service = IdentityService::from_config(&IdentityConfig::from_env());
//!
//! service
//!     .signup(SignupRequest {
//!         first_name: "Ada".into(),
//!         last_name: "Lovelace".into(),
//!         email: "ada@example.com".into(),
//!         password: "correct horse battery".into(),
//!         newsletter: false,
//!     })
//!     .await?;
//! let profile = service.login("ada@example.com", "correct horse battery").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use config::*;
pub use error::*;
pub use models::*;
pub use repository::*;
pub use service::*;
