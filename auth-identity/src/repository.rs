use crate::{error::*, models::*};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Fails with `UserAlreadyExists` when the email is taken
    async fn create_user(&self, user: User) -> Result<()>;
}

type UserMap = BTreeMap<String, User>;

/// All users in one pretty-printed JSON object keyed by email.
///
/// Writes go to a sibling temp file first and are renamed into place; a
/// process-local lock serializes read-modify-write cycles.
pub struct FileUserRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileUserRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<UserMap> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(UserMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UserMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, users: &UserMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(users)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FileUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.load().await?.remove(email))
    }

    async fn create_user(&self, user: User) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        if users.contains_key(&user.email) {
            return Err(IdentityError::UserAlreadyExists);
        }
        users.insert(user.email.clone(), user);
        self.save(&users).await
    }
}
