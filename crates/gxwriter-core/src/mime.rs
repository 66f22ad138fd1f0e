//! File type registration
//!
//! The host registers the GX type once at startup; the conversion code
//! itself holds no process-wide state.

use serde::{Deserialize, Serialize};

/// MIME name of GX containers.
pub const GX_MIME_NAME: &str = "application/xgcode";

/// File suffix of GX containers.
pub const GX_SUFFIX: &str = "gx";

/// A registered file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeType {
    pub name: String,
    pub comment: String,
    pub suffixes: Vec<String>,
}

impl MimeType {
    /// The GX (xgcode) file type.
    pub fn gx() -> Self {
        Self {
            name: GX_MIME_NAME.to_string(),
            comment: "GX (xgcode)".to_string(),
            suffixes: vec![GX_SUFFIX.to_string()],
        }
    }
}

/// Registry of known output file types, owned by the host application.
#[derive(Debug, Default, Clone)]
pub struct MimeRegistry {
    types: Vec<MimeType>,
}

impl MimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the GX type already registered.
    pub fn with_gx() -> Self {
        let mut registry = Self::new();
        registry.register(MimeType::gx());
        registry
    }

    /// Register a type; re-registering a name replaces the earlier entry.
    pub fn register(&mut self, mime: MimeType) {
        tracing::debug!(name = %mime.name, suffixes = ?mime.suffixes, "Registering MIME type");
        self.types.retain(|t| t.name != mime.name);
        self.types.push(mime);
    }

    pub fn by_name(&self, name: &str) -> Option<&MimeType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Look up a type by file suffix, case-insensitively and without the dot.
    pub fn by_suffix(&self, suffix: &str) -> Option<&MimeType> {
        let suffix = suffix.trim_start_matches('.');
        self.types
            .iter()
            .find(|t| t.suffixes.iter().any(|s| s.eq_ignore_ascii_case(suffix)))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
