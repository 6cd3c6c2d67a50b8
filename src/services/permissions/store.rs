use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RecorderError;

/// Grants remembered across restarts so granted prompts are not repeated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFlags {
    pub microphone_granted: bool,
    pub screen_granted: bool,
}

pub struct PermissionStore {
    path: PathBuf,
    flags: PermissionFlags,
}

impl PermissionStore {
    /// Store under the user's config directory
    pub fn open_default(app_dir_name: &str) -> Self {
        let mut path = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
        path.push(app_dir_name);
        path.push("permissions.json");
        Self::open(path)
    }

    /// Load flags from `path`. A missing or unreadable file yields no grants.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let flags = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring corrupt permission cache {}: {}", path.display(), e);
                PermissionFlags::default()
            }),
            Err(_) => PermissionFlags::default(),
        };
        debug!("Permission cache {:?} loaded from {}", flags, path.display());
        Self { path, flags }
    }

    pub fn flags(&self) -> PermissionFlags {
        self.flags
    }

    /// Apply `update` and persist the result if anything changed.
    pub fn update(
        &mut self,
        update: impl FnOnce(&mut PermissionFlags),
    ) -> Result<(), RecorderError> {
        let mut flags = self.flags;
        update(&mut flags);
        if flags == self.flags {
            return Ok(());
        }
        self.flags = flags;
        self.save()
    }

    fn save(&self) -> Result<(), RecorderError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.flags)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
