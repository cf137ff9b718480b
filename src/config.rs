//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bintree/bintree.toml`
//! 3. Local config: `<dir>/.bintree.toml` (usually the working directory)
//! 4. Environment variables: `BINTREE_*` prefix, `__` between sections
//!
//! Command-line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::{GraphStyle, ParseOptions, RankDir};

/// Graph export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GraphSettings {
    pub rankdir: RankDir,
    /// Canvas background color
    pub bgcolor: String,
    /// Node fill color
    pub fillcolor: String,
    /// Node border color
    pub color: String,
    /// Directory rendered images are written to
    pub image_dir: PathBuf,
    /// Output format handed to the renderer (`-T<format>`)
    pub format: String,
    /// Graphviz executable
    pub dot_command: String,
}

impl Default for GraphSettings {
    fn default() -> Self {
        let style = GraphStyle::default();
        Self {
            rankdir: style.rankdir,
            bgcolor: style.bgcolor,
            fillcolor: style.fillcolor,
            color: style.color,
            image_dir: PathBuf::from("imgs"),
            format: "png".into(),
            dot_command: "dot".into(),
        }
    }
}

impl GraphSettings {
    pub fn style(&self) -> GraphStyle {
        GraphStyle {
            rankdir: self.rankdir,
            bgcolor: self.bgcolor.clone(),
            fillcolor: self.fillcolor.clone(),
            color: self.color.clone(),
        }
    }
}

/// Unified configuration for bintree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// HTML log receiving one `<img>` line per dump
    pub log_file: PathBuf,
    /// Prefix reader settings
    pub parse: ParseOptions,
    /// Graph export settings
    pub graph: GraphSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("log.html"),
            parse: ParseOptions::default(),
            graph: GraphSettings::default(),
        }
    }
}

/// Get the XDG config directory for bintree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bintree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bintree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".bintree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the text as is.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory searched for `.bintree.toml`
    #[instrument(level = "debug")]
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let local = local_dir
            .map(local_config_path)
            .filter(|p| p.exists());
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Layer explicit config files over the defaults, then the environment.
    pub fn load_from(
        global: Option<&Path>,
        local: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let defaults = Config::try_from(&Settings::default()).map_err(config_err)?;
        let mut builder = Config::builder().add_source(defaults);

        for path in [global, local].into_iter().flatten() {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("BINTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.expand_paths();
        settings.validate()?;

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.graph.image_dir = expand_path(&self.graph.image_dir);
        self.log_file = expand_path(&self.log_file);
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.parse.max_depth == 0 {
            return Err(ApplicationError::Config {
                message: "parse.max_depth must be at least 1".into(),
            });
        }
        if self.graph.format.is_empty() {
            return Err(ApplicationError::Config {
                message: "graph.format must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# bintree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/bintree/bintree.toml
#   Local:  ./.bintree.toml
#   Env:    BINTREE_* environment variables, e.g. BINTREE_PARSE__MODE=reference

# HTML log receiving one <img> line per rendered dump
# log_file = "log.html"

[parse]
# "hardened" rejects malformed input, "reference" keeps the historical reader
# mode = "hardened"

# Deepest nesting accepted
# max_depth = 4096

# Cap on nodes per tree (unset: unlimited)
# node_limit = 100000

[graph]
# rankdir = "TB"
# bgcolor = "#31353b"
# fillcolor = "#7293ba"
# color = "#008080"

# Rendered images land here as img_<index>_time_<HH-MM-SS>.<format>
# image_dir = "imgs"
# format = "png"

# Graphviz executable
# dot_command = "dot"
"##
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParseMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None).expect("load defaults");
        assert_eq!(settings.parse.max_depth, 4096);
        assert_eq!(settings.graph.bgcolor, "#31353b");
        assert_eq!(settings.graph.image_dir, PathBuf::from("imgs"));
        assert_eq!(settings.log_file, PathBuf::from("log.html"));
    }

    #[test]
    fn given_local_over_global_when_loading_then_local_wins() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        fs::write(
            &global,
            "[parse]\nmode = \"reference\"\nmax_depth = 10\n[graph]\nformat = \"svg\"\n",
        )
        .unwrap();
        fs::write(&local, "[parse]\nmax_depth = 20\n").unwrap();

        let settings = Settings::load_from(Some(&global), Some(&local)).unwrap();

        assert_eq!(settings.parse.mode, ParseMode::Reference);
        assert_eq!(settings.parse.max_depth, 20);
        assert_eq!(settings.graph.format, "svg");
        assert_eq!(settings.graph.dot_command, "dot");
    }

    #[test]
    fn given_zero_depth_when_loading_then_config_error() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("local.toml");
        fs::write(&local, "[parse]\nmax_depth = 0\n").unwrap();

        let err = Settings::load_from(None, Some(&local)).unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_tilde_in_image_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings::default();
        settings.graph.image_dir = PathBuf::from("~/bintree-imgs");
        settings.log_file = PathBuf::from("$HOME/log.html");

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.graph.image_dir.starts_with(&home));
        assert!(settings.log_file.starts_with(&home));
    }

    #[test]
    fn given_settings_when_to_toml_then_sections_present() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("[parse]"));
        assert!(toml.contains("[graph]"));
        assert!(toml.contains("mode = \"hardened\""));
        assert!(toml.contains("rankdir = \"TB\""));
    }
}
