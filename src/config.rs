/// Runtime configuration resolved from command line flags and defaults.
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::engine::table::PAGE_SIZE_OPTIONS;

pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub page_size: usize,
}

impl Config {
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_path: Option<PathBuf>,
        page_size: Option<usize>,
    ) -> Result<Self> {
        let page_size = page_size.unwrap_or(PAGE_SIZE_OPTIONS[0]);
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            bail!("--page-size must be one of {PAGE_SIZE_OPTIONS:?}, got {page_size}");
        }
        Ok(Self {
            db_path: db_path.unwrap_or_else(|| data_dir().join("trackview.db")),
            log_path: log_path.unwrap_or_else(|| data_dir().join("trackview.log")),
            page_size,
        })
    }
}

/// Returns the app directory inside the user's data directory.
/// Falls back to the working directory when no data dir is found.
fn data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join("trackview");
        std::fs::create_dir_all(&app_dir).ok();
        app_dir
    } else {
        PathBuf::from(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_win() {
        let config = Config::resolve(
            Some(PathBuf::from("/tmp/items.db")),
            Some(PathBuf::from("/tmp/items.log")),
            Some(300),
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/items.db"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/items.log"));
        assert_eq!(config.page_size, 300);
    }

    #[test]
    fn unsupported_page_size_is_rejected() {
        let result = Config::resolve(Some(PathBuf::from("a.db")), Some(PathBuf::from("a.log")), Some(42));
        assert!(result.is_err());
    }
}
