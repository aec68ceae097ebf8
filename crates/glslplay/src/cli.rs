use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use playconfig::{parse_size, Overrides};

#[derive(Parser, Debug)]
#[command(
    name = "glslplay",
    author,
    version,
    about = "Render a GLSL fragment shader on a full-screen quad"
)]
pub struct Cli {
    /// Configuration file to use instead of the discovered one.
    #[arg(long, global = true, value_name = "FILE", env = "GLSLPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory to search for shader sources; repeat to add more roots.
    #[arg(long = "shader-dir", value_name = "DIR")]
    pub shader_dirs: Vec<PathBuf>,

    /// Logical name (or path) of the vertex shader.
    #[arg(long, value_name = "NAME")]
    pub vertex: Option<String>,

    /// Logical name (or path) of the fragment shader.
    #[arg(long, value_name = "NAME")]
    pub fragment: Option<String>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Abort on the first shader compile or link error instead of rendering on.
    #[arg(long)]
    pub fail_fast: bool,

    /// Freeze the `time` uniform at the given number of seconds.
    #[arg(long, value_name = "SECONDS")]
    pub still_time: Option<f32>,

    /// Present frames as fast as possible.
    #[arg(long)]
    pub no_vsync: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            roots: self.shader_dirs.clone(),
            vertex: self.vertex.clone(),
            fragment: self.fragment.clone(),
            size: self.size,
            fail_fast: self.fail_fast,
            no_vsync: self.no_vsync,
            still_time: self.still_time,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the configuration glslplay would run with.
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Print the location of the configuration file.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "glslplay",
            "--shader-dir",
            "a",
            "--shader-dir",
            "b",
            "--fragment",
            "plasma",
            "--size",
            "640x480",
            "--fail-fast",
            "--still-time",
            "2.5",
            "--no-vsync",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        let overrides = cli.run.overrides();
        assert_eq!(overrides.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(overrides.fragment.as_deref(), Some("plasma"));
        assert_eq!(overrides.vertex, None);
        assert_eq!(overrides.size, Some((640, 480)));
        assert!(overrides.fail_fast);
        assert!(overrides.no_vsync);
        assert_eq!(overrides.still_time, Some(2.5));
    }

    #[test]
    fn rejects_malformed_size() {
        assert!(Cli::try_parse_from(["glslplay", "--size", "640by480"]).is_err());
        assert!(Cli::try_parse_from(["glslplay", "--size", "0x480"]).is_err());
    }

    #[test]
    fn parses_config_subcommands() {
        let cli = Cli::try_parse_from(["glslplay", "config", "where"]).unwrap();
        match cli.command {
            Some(Command::Config(cmd)) => assert_eq!(cmd.action, ConfigAction::Where),
            other => panic!("unexpected command {other:?}"),
        }

        let cli =
            Cli::try_parse_from(["glslplay", "config", "show", "--config", "custom.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
