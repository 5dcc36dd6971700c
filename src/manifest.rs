//! App manifest editing.
//!
//! The mobile scaffold keeps its framework configuration in `app.json` with
//! platform sections nested under the top-level `app` key. Prebuild needs
//! real platform identifiers, so the harness patches them in before running
//! it, but only for platform sections the scaffold actually generated.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

/// An application manifest loaded from disk.
#[derive(Debug)]
pub struct AppManifest {
    path: PathBuf,
    doc: Value,
}

impl AppManifest {
    /// Loads the manifest at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let doc = serde_json::from_str(&content)?;
        Ok(Self { path, doc })
    }

    /// Returns the manifest path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets `app.ios.bundleIdentifier` if the ios section exists.
    ///
    /// Returns whether the field was set.
    pub fn set_ios_bundle_identifier(&mut self, id: &str) -> bool {
        Self::set_platform_field(&mut self.doc, "ios", "bundleIdentifier", id)
    }

    /// Sets `app.android.package` if the android section exists.
    ///
    /// Returns whether the field was set.
    pub fn set_android_package(&mut self, package: &str) -> bool {
        Self::set_platform_field(&mut self.doc, "android", "package", package)
    }

    /// Returns `app.ios.bundleIdentifier` if present.
    pub fn ios_bundle_identifier(&self) -> Option<&str> {
        self.doc["app"]["ios"]["bundleIdentifier"].as_str()
    }

    /// Returns `app.android.package` if present.
    pub fn android_package(&self) -> Option<&str> {
        self.doc["app"]["android"]["package"].as_str()
    }

    /// Writes the manifest back to its original path.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, serde_json::to_string(&self.doc)?)?;
        Ok(())
    }

    fn set_platform_field(doc: &mut Value, platform: &str, field: &str, value: &str) -> bool {
        match doc
            .get_mut("app")
            .and_then(|app| app.get_mut(platform))
            .and_then(Value::as_object_mut)
        {
            Some(section) => {
                section.insert(field.to_string(), Value::String(value.to_string()));
                true
            }
            None => false,
        }
    }
}
