//! Session token cache on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use salt_api::Token;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    address: String,
    username: String,
    token: Token,
}

/// A single cached session token, bound to an address and a username.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Open the cache in `dir`, or in the platform data directory.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => ProjectDirs::from("", "", "saltctl")
                .context("Could not determine data directory")?
                .data_dir()
                .to_path_buf(),
        };

        fs::create_dir_all(&dir).context("Failed to create data directory")?;

        Ok(Self {
            path: dir.join("session.json"),
        })
    }

    /// Returns the token cached for `address` and `username`, unless it has
    /// already expired.
    pub fn load(&self, address: &str, username: &str) -> Result<Option<Token>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).context("Failed to read session file")?;
        let stored: StoredSession = match serde_json::from_str(&json) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid session file");
                return Ok(None);
            }
        };

        if stored.address != address || stored.username != username {
            return Ok(None);
        }
        if stored.token.is_expired(Utc::now(), chrono::Duration::zero()) {
            return Ok(None);
        }

        Ok(Some(stored.token))
    }

    /// Save a token to disk.
    pub fn save(&self, address: &str, username: &str, token: &Token) -> Result<()> {
        let stored = StoredSession {
            address: address.to_string(),
            username: username.to_string(),
            token: token.clone(),
        };

        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, &json).context("Failed to write session file")?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// Remove the cached token. Returns whether there was one.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).context("Failed to remove session file")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(hours: i64) -> Token {
        Token::new("cached", Utc::now() + chrono::Duration::hours(hours))
    }

    #[test]
    fn roundtrip_for_same_identity() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::open(Some(dir.path())).unwrap();

        let saved = token(1);
        cache.save("http://salt:4507/", "admin", &saved).unwrap();
        let loaded = cache.load("http://salt:4507/", "admin").unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn ignores_other_identity_and_expired_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::open(Some(dir.path())).unwrap();

        cache.save("http://salt:4507/", "admin", &token(1)).unwrap();
        assert!(cache.load("http://salt:4507/", "other").unwrap().is_none());
        assert!(cache.load("http://other:4507/", "admin").unwrap().is_none());

        cache.save("http://salt:4507/", "admin", &token(-1)).unwrap();
        assert!(cache.load("http://salt:4507/", "admin").unwrap().is_none());
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::open(Some(dir.path())).unwrap();

        assert!(!cache.clear().unwrap());
        cache.save("http://salt:4507/", "admin", &token(1)).unwrap();
        assert!(cache.clear().unwrap());
        assert!(cache.load("http://salt:4507/", "admin").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::open(Some(dir.path())).unwrap();
        cache.save("http://salt:4507/", "admin", &token(1)).unwrap();

        let mode = fs::metadata(dir.path().join("session.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
