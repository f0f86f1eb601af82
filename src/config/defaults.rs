//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// Top-level Defaults
// ============================================================================

pub mod pages {
    use std::path::PathBuf;

    pub fn dirs() -> Vec<PathBuf> {
        vec!["src/pages".into()]
    }

    pub fn sub_packages() -> Vec<PathBuf> {
        vec![]
    }

    pub fn sub_root_prefix() -> String {
        "".into()
    }

    pub fn exclude() -> Vec<String> {
        vec!["node_modules".into(), ".git".into(), "**/__*__/**".into()]
    }

    pub fn out_dir() -> PathBuf {
        "src".into()
    }

    pub fn home_page() -> Vec<String> {
        vec!["pages/index".into(), "pages/index/index".into()]
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5278
    }
}
