use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "glslplay.toml";

const CONFIG_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read configuration at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub shaders: ShaderSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShaderSettings {
    /// Directories searched for shader sources, in order.
    pub roots: Vec<PathBuf>,
    pub vertex: String,
    pub fragment: String,
    /// Abort startup on the first compile or link failure.
    pub fail_fast: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Freeze the `time` uniform at this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub still_time: Option<f32>,
}

/// Command-line values layered on top of the file configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub roots: Vec<PathBuf>,
    pub vertex: Option<String>,
    pub fragment: Option<String>,
    pub size: Option<(u32, u32)>,
    pub fail_fast: bool,
    pub no_vsync: bool,
    pub still_time: Option<f32>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            window: WindowSettings::default(),
            shaders: ShaderSettings::default(),
            render: RenderSettings::default(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 720,
            title: "glslplay".to_string(),
            vsync: true,
        }
    }
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from("shaders")],
            vertex: "vertex".to_string(),
            fragment: "fragment".to_string(),
            fail_fast: false,
        }
    }
}

impl PlayConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: PlayConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads `path` when it exists and falls back to defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if !overrides.roots.is_empty() {
            self.shaders.roots = overrides.roots;
        }
        if let Some(vertex) = overrides.vertex {
            self.shaders.vertex = vertex;
        }
        if let Some(fragment) = overrides.fragment {
            self.shaders.fragment = fragment;
        }
        if let Some((width, height)) = overrides.size {
            self.window.width = width;
            self.window.height = height;
        }
        if overrides.fail_fast {
            self.shaders.fail_fast = true;
        }
        if overrides.no_vsync {
            self.window.vsync = false;
        }
        if overrides.still_time.is_some() {
            self.render.still_time = overrides.still_time;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero (got {}x{})",
                self.window.width, self.window.height
            )));
        }

        if self.shaders.vertex.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "shaders.vertex may not be empty".into(),
            ));
        }

        if self.shaders.fragment.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "shaders.fragment may not be empty".into(),
            ));
        }

        if let Some(time) = self.render.still_time {
            if !time.is_finite() || time < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "render.still_time must be a non-negative number of seconds (got {time})"
                )));
            }
        }

        Ok(())
    }
}

/// Parses `WIDTHxHEIGHT` into a non-zero pixel size.
pub fn parse_size(value: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::Invalid(format!("size must be WIDTHxHEIGHT, got '{value}'"));
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}
