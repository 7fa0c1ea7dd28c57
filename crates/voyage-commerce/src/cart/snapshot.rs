//! JSON persistence for carts.

use crate::cart::{AppliedPromo, CartItem};
use crate::error::CommerceError;
use crate::ids::CartId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current on-disk format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable cart contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub version: u32,
    pub cart_id: CartId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo: Option<AppliedPromo>,
}

impl CartSnapshot {
    pub fn new(cart_id: CartId, items: Vec<CartItem>, promo: Option<AppliedPromo>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            cart_id,
            items,
            promo,
        }
    }

    /// Reject snapshots written by an incompatible format version.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CommerceError::Snapshot(format!(
                "unsupported version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, CommerceError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, CommerceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Read a snapshot file, or None if it does not exist yet.
    pub fn load_if_exists(path: impl AsRef<Path>) -> Result<Option<Self>, CommerceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Write the snapshot, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CommerceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
