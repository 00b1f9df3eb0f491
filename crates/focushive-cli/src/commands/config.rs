//! Configuration commands for CLI.

use std::path::Path;

use clap::Subcommand;
use focushive_core::{CoreError, Result};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration as TOML
    Show,
    /// Print where the config file lives
    Path,
}

pub fn run(action: ConfigAction, data_dir: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = super::load_config(data_dir)?;
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| CoreError::Custom(e.to_string()))?;
            print!("{rendered}");
        }
        ConfigAction::Path => {
            println!("{}", super::config_path(data_dir)?.display());
        }
    }
    Ok(())
}
