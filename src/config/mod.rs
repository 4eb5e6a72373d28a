//! Site configuration management for `webcore.toml`.
//!
//! The file is optional: without it every field takes its default, which
//! reproduces the classic `src/` → `build/` layout.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[build]`   | Source/output paths, master templates, limits  |
//! | `[serve]`   | Development server (interface, port)           |
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"
//! output = "build"
//!
//! [serve]
//! port = 3000
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use serve::ServeConfig;

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing webcore.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute project root (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading, may not exist)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config for a CLI invocation.
    ///
    /// A missing config file yields the defaults. All paths come back absolute.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = normalize_path(cli.root.as_deref().unwrap_or(Path::new("./")));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.config_path = config_path;
        config.update_with_cli(cli);
        config.resolve_paths(&root);
        config.validate()?;

        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every path against `root`; `content` and `static` hang off `source`.
    pub fn resolve_paths(&mut self, root: &Path) {
        self.root = normalize_path(root);
        let build = &mut self.build;
        build.source = normalize_path(&self.root.join(&build.source));
        build.output = normalize_path(&self.root.join(&build.output));
        build.content = build.source.join(&build.content);
        build.static_dir = build.source.join(&build.static_dir);
    }

    /// Socket address the dev server binds to.
    pub fn serve_addr(&self) -> Result<SocketAddr> {
        let interface: IpAddr = self.serve.interface.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "[serve.interface] `{}` is not an IP address",
                self.serve.interface
            ))
        })?;
        Ok(SocketAddr::new(interface, self.serve.port))
    }

    /// Validate resolved configuration
    pub fn validate(&self) -> Result<()> {
        let build = &self.build;

        if build.output.starts_with(&build.source) {
            bail!(ConfigError::Validation(
                "[build.output] must not be inside [build.source]".into()
            ));
        }

        // The output directory is wiped on every build
        if build.source.starts_with(&build.output) || self.root.starts_with(&build.output) {
            bail!(ConfigError::Validation(
                "[build.output] must not contain [build.source] or the project root".into()
            ));
        }

        if build.post_template.is_empty() || build.tag_template.is_empty() {
            bail!(ConfigError::Validation(
                "[build.post_template] and [build.tag_template] must not be empty".into()
            ));
        }

        self.serve_addr()?;
        Ok(())
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("webcore").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let config = SiteConfig::load(&cli(&["--root", root])).unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.build.source, root.join("src"));
        assert_eq!(config.build.output, root.join("build"));
        assert_eq!(config.build.content, root.join("src/posts"));
        assert_eq!(config.build.static_dir, root.join("src/static"));
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_load_reads_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("webcore.toml"),
            "[build]\noutput = \"public\"\n[serve]\nport = 9000\n",
        )
        .unwrap();

        let config = SiteConfig::load(&cli(&["--root", dir.path().to_str().unwrap()])).unwrap();

        assert!(config.build.output.ends_with("public"));
        assert_eq!(config.serve.port, 9000);
    }

    #[test]
    fn test_cli_port_overrides_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("webcore.toml"), "[serve]\nport = 9000\n").unwrap();

        let root = dir.path().to_str().unwrap();
        let config = SiteConfig::load(&cli(&["--root", root, "--port", "4000"])).unwrap();

        assert_eq!(config.serve.port, 4000);
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("webcore.toml"), "[build\n").unwrap();

        let result = SiteConfig::load(&cli(&["--root", dir.path().to_str().unwrap()]));

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_output_inside_source_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("webcore.toml"), "[build]\noutput = \"src/out\"\n").unwrap();

        let result = SiteConfig::load(&cli(&["--root", dir.path().to_str().unwrap()]));

        assert!(result.unwrap_err().to_string().contains("[build.output]"));
    }

    #[test]
    fn test_output_containing_source_rejected() {
        for output in [".", "..", "src/.."] {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("src/posts")).unwrap();
            fs::write(dir.path().join("src/posts/keep.md"), "kept").unwrap();
            fs::write(
                dir.path().join("webcore.toml"),
                format!("[build]\noutput = \"{output}\"\n"),
            )
            .unwrap();

            let err = SiteConfig::load(&cli(&["--root", dir.path().to_str().unwrap()]))
                .unwrap_err();

            assert!(
                matches!(
                    err.downcast_ref::<ConfigError>(),
                    Some(ConfigError::Validation(_))
                ),
                "output = {output:?} should be rejected"
            );
            assert!(dir.path().join("src/posts/keep.md").exists());
        }
    }

    #[test]
    fn test_output_sibling_of_source_accepted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("webcore.toml"), "[build]\noutput = \"public\"\n").unwrap();

        assert!(SiteConfig::load(&cli(&["--root", dir.path().to_str().unwrap()])).is_ok());
    }

    #[test]
    fn test_invalid_interface_rejected() {
        let mut config = SiteConfig::default();
        config.serve.interface = "localhost".into();
        config.resolve_paths(Path::new("/site"));

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serve_addr() {
        let mut config = SiteConfig::default();
        config.serve.port = 8123;

        let addr = config.serve_addr().unwrap();
        assert_eq!(addr.port(), 8123);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/definitely/not/here");
        assert_eq!(normalize_path(path), PathBuf::from("/definitely/not/here"));
    }

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("not-here-either"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("not-here-either"));
    }
}
