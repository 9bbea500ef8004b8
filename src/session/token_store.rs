//! Token persistence
//!
//! Keeps the access token in a single file so a later run starts
//! authenticated.

use std::path::{Path, PathBuf};

use super::SessionError;

/// File-backed token storage
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_local_dir>/incubator-portal/access_token`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|p| p.join("incubator-portal"))
            .unwrap_or_else(|| PathBuf::from("./incubator_data"))
            .join("access_token")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token; a missing or blank file means no token
    pub fn load(&self) -> Result<Option<String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok(if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Io {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }

    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        std::fs::write(&self.path, token).map_err(|e| SessionError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_and_clear() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("access_token"));

        assert_eq!(store.load().unwrap(), None);

        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc123".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_blank_file_is_no_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("access_token");
        std::fs::write(&path, "  \n").unwrap();

        let store = TokenStore::new(path);
        assert_eq!(store.load().unwrap(), None);
    }
}
