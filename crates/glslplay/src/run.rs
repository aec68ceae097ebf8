//! Startup orchestration: config discovery, CLI overrides, loader and renderer
//! wiring.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use playconfig::PlayConfig;
use renderer::{RenderPolicy, Renderer, RendererConfig, ShaderErrorPolicy, ShaderNames};
use shaderload::{DirectoryLoader, BUILTIN_VERTEX};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

const DEFAULT_FILTER: &str = "warn,glslplay=info,renderer=info,shaderload=info";

pub fn initialise_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Where the configuration comes from and whether the user asked for it.
#[derive(Debug, Clone)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub explicit: bool,
}

impl ConfigLocation {
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Ok(Self {
                path: path.to_path_buf(),
                explicit: true,
            }),
            None => {
                let paths = AppPaths::discover()?;
                tracing::debug!(dir = %paths.config_dir().display(), "using config directory");
                Ok(Self {
                    path: paths.config_file(),
                    explicit: false,
                })
            }
        }
    }
}

/// Reads the config file (an explicit one must exist) and applies CLI flags.
pub fn load_config(location: &ConfigLocation, args: &RunArgs) -> Result<PlayConfig> {
    let mut config = if location.explicit {
        if !location.path.is_file() {
            bail!("config file {} does not exist", location.path.display());
        }
        PlayConfig::load(&location.path)
    } else {
        PlayConfig::load_or_default(&location.path)
    }
    .with_context(|| format!("failed to load config from {}", location.path.display()))?;

    config
        .apply(args.overrides())
        .context("invalid command-line overrides")?;
    tracing::debug!(path = %location.path.display(), "configuration resolved");
    Ok(config)
}

pub fn renderer_config(config: &PlayConfig) -> RendererConfig {
    RendererConfig {
        surface_size: (config.window.width, config.window.height),
        title: config.window.title.clone(),
        vsync: config.window.vsync,
        shaders: ShaderNames {
            vertex: config.shaders.vertex.clone(),
            fragment: config.shaders.fragment.clone(),
        },
        error_policy: ShaderErrorPolicy::from_fail_fast(config.shaders.fail_fast),
        policy: RenderPolicy::from_still_time(config.render.still_time),
    }
}

pub fn shader_loader(config: &PlayConfig) -> DirectoryLoader {
    DirectoryLoader::new(config.shaders.roots.iter().cloned())
        .with_builtin("vertex", BUILTIN_VERTEX)
}

pub fn run(config: PlayConfig) -> Result<()> {
    let loader = shader_loader(&config);
    tracing::info!(
        roots = ?loader.roots(),
        width = config.window.width,
        height = config.window.height,
        "launching shader playground"
    );
    Renderer::new(renderer_config(&config), loader)
        .run()
        .context("shader playground failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_discovered_config_means_defaults() {
        let dir = TempDir::new().unwrap();
        let location = ConfigLocation {
            path: dir.path().join("glslplay.toml"),
            explicit: false,
        };
        let config = load_config(&location, &RunArgs::default()).unwrap();
        assert_eq!(config, PlayConfig::default());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let location = ConfigLocation {
            path: dir.path().join("nope.toml"),
            explicit: true,
        };
        assert!(load_config(&location, &RunArgs::default()).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glslplay.toml");
        fs::write(
            &path,
            "[window]\nwidth = 800\nheight = 600\n\n[shaders]\nfragment = \"waves\"\n",
        )
        .unwrap();
        let location = ConfigLocation {
            path,
            explicit: true,
        };
        let args = RunArgs {
            size: Some((640, 480)),
            fail_fast: true,
            ..RunArgs::default()
        };

        let config = load_config(&location, &args).unwrap();
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert_eq!(config.shaders.fragment, "waves");
        assert!(config.shaders.fail_fast);
    }

    #[test]
    fn maps_config_onto_renderer() {
        let mut config = PlayConfig::default();
        config.shaders.fail_fast = true;
        config.render.still_time = Some(1.5);
        config.window.vsync = false;

        let renderer = renderer_config(&config);
        assert_eq!(renderer.surface_size, (1080, 720));
        assert_eq!(renderer.error_policy, ShaderErrorPolicy::FailFast);
        assert_eq!(renderer.policy, RenderPolicy::Still { time: 1.5 });
        assert!(!renderer.vsync);
        assert_eq!(renderer.shaders, ShaderNames::default());
    }

    #[test]
    fn loader_serves_builtin_vertex() {
        use shaderload::SourceLoader;

        let dir = TempDir::new().unwrap();
        let mut config = PlayConfig::default();
        config.shaders.roots = vec![dir.path().to_path_buf()];

        let loader = shader_loader(&config);
        assert_eq!(loader.load("vertex").unwrap(), BUILTIN_VERTEX);
        assert!(loader.load("fragment").is_err());
    }
}
