mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction};
use run::ConfigLocation;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let location = ConfigLocation::resolve(cli.config.as_deref())?;
    match cli.command {
        Some(Command::Config(config_cmd)) => {
            handle_config_command(config_cmd.action, &location, &cli.run)
        }
        None => run::run(run::load_config(&location, &cli.run)?),
    }
}

fn handle_config_command(
    action: ConfigAction,
    location: &ConfigLocation,
    args: &cli::RunArgs,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = run::load_config(location, args)?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Where => {
            let status = if location.path.is_file() {
                "present"
            } else {
                "missing, defaults in use"
            };
            println!("{}", location.path.display());
            tracing::debug!(status, "config file lookup");
        }
    }
    Ok(())
}
