//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the config was loaded from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "loaded config");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    match CliConfig::load(config_path.to_str()?) {
                        Ok(config) => return Some((config, config_path)),
                        Err(e) => {
                            tracing::warn!(path = %config_path.display(), error = %e, "skipping unreadable config")
                        }
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// The cart snapshot file.
    pub fn cart_path(&self) -> PathBuf {
        self.resolve_config_path(&self.config.cart.snapshot)
    }

    /// Local file for a catalog, if a data directory is configured.
    pub fn catalog_file(&self, catalog: &str) -> Option<PathBuf> {
        let dir = self.config.search.data_dir.as_ref()?;
        Some(self.resolve_config_path(dir).join(format!("{}.json", catalog)))
    }

    /// Resolve a command line path relative to the working directory.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        resolve_against(&self.cwd, path.as_ref())
    }

    /// Resolve a path from the config file relative to the directory holding
    /// that file, so every subdirectory shares one cart and data dir.
    pub fn resolve_config_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .map(|dir| resolve_against(&self.cwd, dir))
            .unwrap_or_else(|| self.cwd.clone());
        resolve_against(&base, path.as_ref())
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(cwd: &Path, config_path: Option<PathBuf>) -> Context {
        Context {
            config: CliConfig::default(),
            config_path,
            output: Output::new(false, true),
            cwd: cwd.to_path_buf(),
        }
    }

    #[test]
    fn test_config_paths_follow_discovered_config() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("trips").join("summer");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("voyage.toml"), "[search]\ndata_dir = \"data\"\n").unwrap();

        let (config, path) = Context::find_config(&nested).unwrap();
        let mut ctx = context(&nested, Some(path));
        ctx.config = config;

        assert_eq!(ctx.cart_path(), root.path().join(".voyage").join("cart.json"));
        assert_eq!(ctx.catalog_file("tours"), Some(root.path().join("data").join("tours.json")));
        assert_eq!(ctx.resolve_path("tours.json"), nested.join("tours.json"));
    }

    #[test]
    fn test_config_paths_without_config_use_cwd() {
        let cwd = tempfile::tempdir().unwrap();
        let ctx = context(cwd.path(), None);
        assert_eq!(ctx.cart_path(), cwd.path().join(".voyage").join("cart.json"));
        assert_eq!(ctx.catalog_file("cars"), None);
    }

    #[test]
    fn test_relative_config_flag_resolves_from_cwd() {
        let cwd = tempfile::tempdir().unwrap();
        let ctx = context(cwd.path(), Some(PathBuf::from("conf/voyage.toml")));
        assert_eq!(ctx.cart_path(), cwd.path().join("conf").join(".voyage").join("cart.json"));
    }
}
