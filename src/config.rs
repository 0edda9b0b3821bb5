//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/storytree/storytree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `STORYTREE_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{LayoutConfig, ScreenTransform};

const ENV_PREFIX: &str = "STORYTREE";

/// Raw layout config for intermediate parsing (`None` → inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub node_size: Option<f64>,
    pub sibling_distance: Option<f64>,
    pub tree_distance: Option<f64>,
}

/// Raw screen transform for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawScreenTransform {
    pub cell_width: Option<f64>,
    pub cell_height: Option<f64>,
    pub margin_x: Option<f64>,
    pub margin_y: Option<f64>,
    pub flip_y: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub layout: RawLayoutConfig,
    pub screen: RawScreenTransform,
}

/// Unified configuration for storytree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Spacing constants for the layout engine
    pub layout: LayoutConfig,
    /// Mapping from layout units to screen coordinates
    pub screen: ScreenTransform,
}

/// Get the XDG config directory for storytree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "storytree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("storytree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e.message()),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let layout = &overlay.layout;
        let screen = &overlay.screen;
        Self {
            layout: LayoutConfig {
                node_size: layout.node_size.unwrap_or(self.layout.node_size),
                sibling_distance: layout
                    .sibling_distance
                    .unwrap_or(self.layout.sibling_distance),
                tree_distance: layout.tree_distance.unwrap_or(self.layout.tree_distance),
            },
            screen: ScreenTransform {
                cell_width: screen.cell_width.unwrap_or(self.screen.cell_width),
                cell_height: screen.cell_height.unwrap_or(self.screen.cell_height),
                margin_x: screen.margin_x.unwrap_or(self.screen.margin_x),
                margin_y: screen.margin_y.unwrap_or(self.screen.margin_y),
                flip_y: screen.flip_y.unwrap_or(self.screen.flip_y),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line; it must exist
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_from(global_config_path().as_deref(), local)
    }

    /// Load settings from explicit file locations.
    ///
    /// A missing global file is skipped; a missing local file is an error,
    /// since the user asked for it.
    #[instrument(level = "debug")]
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Local config
        if let Some(local_path) = local {
            debug!(path = %local_path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current, ENV_PREFIX)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply `<prefix>_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, prefix: &str) -> ApplicationResult<Self> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        let float = |key: &str| -> ApplicationResult<Option<f64>> {
            match config.get_float(key) {
                Ok(val) => Ok(Some(val)),
                Err(ConfigError::NotFound(_)) => Ok(None),
                Err(e) => Err(config_err(e)),
            }
        };

        if let Some(val) = float("layout.node_size")? {
            settings.layout.node_size = val;
        }
        if let Some(val) = float("layout.sibling_distance")? {
            settings.layout.sibling_distance = val;
        }
        if let Some(val) = float("layout.tree_distance")? {
            settings.layout.tree_distance = val;
        }
        if let Some(val) = float("screen.cell_width")? {
            settings.screen.cell_width = val;
        }
        if let Some(val) = float("screen.cell_height")? {
            settings.screen.cell_height = val;
        }
        if let Some(val) = float("screen.margin_x")? {
            settings.screen.margin_x = val;
        }
        if let Some(val) = float("screen.margin_y")? {
            settings.screen.margin_y = val;
        }
        match config.get_bool("screen.flip_y") {
            Ok(val) => settings.screen.flip_y = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    pub fn validate(&self) -> ApplicationResult<()> {
        self.layout.validate()?;
        self.screen.validate()?;
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# storytree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/storytree/storytree.toml
#   Local:  file passed with --config
#   Env:    STORYTREE_<SECTION>__<KEY>, e.g. STORYTREE_LAYOUT__NODE_SIZE=2

[layout]
# Minimum width reserved per node
# node_size = 1.0

# Extra gap between adjacent siblings on the same level
# sibling_distance = 0.0

# Extra gap between neighbouring subtrees on deeper levels
# tree_distance = 0.0

[screen]
# Size of one layout unit on screen
# cell_width = 30.0
# cell_height = 30.0

# Offset added after scaling
# margin_x = 50.0
# margin_y = 40.0

# Negate depth so the tree grows downwards in y-up coordinates
# flip_y = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
