//! Token and metadata persistence (~/.config/pindrop/)

use super::types::{EntitlementMeta, EntitlementRecord, PremiumError};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

const TOKEN_FILENAME: &str = "premium.token";
const META_FILENAME: &str = "premium.json";

/// What a previous session left behind. The token is the only thing that
/// matters; metadata without a token is never loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntitlement {
    pub token: String,
    pub meta: Option<EntitlementMeta>,
}

impl StoredEntitlement {
    pub fn record(&self) -> Option<EntitlementRecord> {
        self.meta.as_ref().map(|m| EntitlementRecord {
            plan: m.plan,
            email: m.email.clone(),
            issued_at: m.issued_at,
            token: self.token.clone(),
        })
    }
}

/// Durable local storage for the signed token.
pub trait TokenStore {
    fn load(&self) -> Option<StoredEntitlement>;

    fn save(&self, record: &EntitlementRecord) -> Result<(), PremiumError>;

    /// Removes everything. Missing files are not an error.
    fn clear(&self) -> Result<(), PremiumError>;
}

/// Returns `~/.config/pindrop/`, creating it if needed.
pub fn config_dir() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("pindrop");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}

/// File-backed store: `premium.token` plus `premium.json`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the user config directory.
    pub fn in_config_dir() -> Option<Self> {
        config_dir().map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_token(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.dir.join(TOKEN_FILENAME)).ok()?;
        let trimmed = content.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    fn load_meta(&self) -> Option<EntitlementMeta> {
        let content = std::fs::read_to_string(self.dir.join(META_FILENAME)).ok()?;
        serde_json::from_str(&content).ok()
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<StoredEntitlement> {
        let token = self.load_token()?;
        Some(StoredEntitlement {
            token,
            meta: self.load_meta(),
        })
    }

    fn save(&self, record: &EntitlementRecord) -> Result<(), PremiumError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PremiumError::Storage(e.to_string()))?;
        let json = serde_json::to_string_pretty(&record.meta())
            .map_err(|e| PremiumError::Storage(e.to_string()))?;
        std::fs::write(self.dir.join(TOKEN_FILENAME), record.token.trim())
            .map_err(|e| PremiumError::Storage(e.to_string()))?;
        std::fs::write(self.dir.join(META_FILENAME), json)
            .map_err(|e| PremiumError::Storage(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), PremiumError> {
        for name in [TOKEN_FILENAME, META_FILENAME] {
            match std::fs::remove_file(self.dir.join(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(PremiumError::Storage(e.to_string())),
            }
        }
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RefCell<Option<StoredEntitlement>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the store as if an earlier session had saved `stored`.
    pub fn with_stored(stored: StoredEntitlement) -> Self {
        Self {
            inner: RefCell::new(Some(stored)),
        }
    }

    pub fn snapshot(&self) -> Option<StoredEntitlement> {
        self.inner.borrow().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<StoredEntitlement> {
        self.inner.borrow().clone()
    }

    fn save(&self, record: &EntitlementRecord) -> Result<(), PremiumError> {
        *self.inner.borrow_mut() = Some(StoredEntitlement {
            token: record.token.clone(),
            meta: Some(record.meta()),
        });
        Ok(())
    }

    fn clear(&self) -> Result<(), PremiumError> {
        self.inner.borrow_mut().take();
        Ok(())
    }
}

impl<T: TokenStore + ?Sized> TokenStore for std::rc::Rc<T> {
    fn load(&self) -> Option<StoredEntitlement> {
        (**self).load()
    }

    fn save(&self, record: &EntitlementRecord) -> Result<(), PremiumError> {
        (**self).save(record)
    }

    fn clear(&self) -> Result<(), PremiumError> {
        (**self).clear()
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Box<T> {
    fn load(&self) -> Option<StoredEntitlement> {
        (**self).load()
    }

    fn save(&self, record: &EntitlementRecord) -> Result<(), PremiumError> {
        (**self).save(record)
    }

    fn clear(&self) -> Result<(), PremiumError> {
        (**self).clear()
    }
}
