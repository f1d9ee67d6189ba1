use std::path::{Path, PathBuf};

pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["wav", "mp3", "mp4", "m4a", "flac", "ogg", "webm"];
/// 100 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub upload_folder: PathBuf,
    /// Lowercase audio extensions accepted for upload
    pub allowed_extensions: Vec<String>,
    pub max_file_size: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl StoreConfig {
    /// Load storage configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(folder) = std::env::var("AISCRIBE_UPLOAD_FOLDER") {
            config.upload_folder = PathBuf::from(folder);
        }
        if let Some(max) = std::env::var("AISCRIBE_MAX_FILE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.max_file_size = max;
        }
        config
    }

    pub fn with_upload_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.upload_folder = folder.into();
        self
    }

    /// Whether the file name carries one of the allowed extensions
    pub fn is_allowed(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.allowed_extensions.iter().any(|allowed| *allowed == ext))
    }
}
