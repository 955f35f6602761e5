//! Canonical file locations inside a session directory.

use std::path::PathBuf;

/// Default session directory, relative to the working directory.
pub const DEFAULT_SESSION_DIR: &str = ".cycler";

#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub session_dir: PathBuf,
    pub store_path: PathBuf,
    pub config_path: PathBuf,
    pub page_path: PathBuf,
}

impl SessionPaths {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        let session_dir = session_dir.into();
        Self {
            store_path: session_dir.join("session.json"),
            config_path: session_dir.join("config.toml"),
            page_path: session_dir.join("page.json"),
            session_dir,
        }
    }

    /// Use a page fixture outside the session directory.
    pub fn with_page(mut self, page_path: impl Into<PathBuf>) -> Self {
        self.page_path = page_path.into();
        self
    }
}
