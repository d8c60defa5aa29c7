pub mod commands;
pub mod console;
pub mod db;
pub mod directory;
pub mod error;
pub mod metrics;
pub mod plans;
pub mod session;
pub mod settings;
pub mod utils;

use std::path::PathBuf;

use anyhow::{Context, Error, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use console::PickerConsole;
use db::{
    models::{NewPicker, ProfileEdit},
    Database,
};
use settings::{default_data_dir, ConfigStore, ConsoleConfig, CONFIG_PATH_ENV};

pub struct AppState {
    pub console: PickerConsole<Database>,
    pub config: ConfigStore,
}

impl AppState {
    pub fn open(config: ConfigStore) -> Result<Self> {
        let resolved = config.config().with_env_overrides()?;
        let database = Database::new(resolved.database_path.clone())?;
        Ok(Self {
            console: PickerConsole::new(database, &resolved),
            config,
        })
    }
}

#[derive(Parser)]
#[command(name = "picker-console")]
#[command(about = "Manage pickers, their order metrics and the global skip button")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List every picker with order metrics (default)
    List,

    /// Fleet totals and the global skip button
    Dashboard,

    /// Open one picker's profile
    Show { mobile: String },

    /// Close the open profile
    Close,

    /// Create a picker with an empty order history
    Add {
        mobile: String,
        name: String,
        password: String,
        organization_id: String,
    },

    /// Save profile edits, moving the record if the mobile number changes
    Edit {
        mobile: String,
        new_mobile: String,
        name: String,
        password: String,
    },

    /// Delete a picker
    Delete { mobile: String },

    /// Log in as an admin
    Login { email: String, password: String },

    /// End the admin session
    Logout,

    /// Show the global skip button setting
    Settings,

    /// Set the global skip button and mirror it onto every picker
    SetSkip {
        #[arg(action = ArgAction::Set)]
        value: bool,
    },

    /// Flip the global skip button
    ToggleSkip,

    /// Show the console configuration, or persist changes to it
    Config {
        /// Database file
        #[arg(long)]
        database: Option<PathBuf>,

        /// Upper bound on each store call, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Retry rounds for failed global flag updates
        #[arg(long)]
        retries: Option<u32>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn configure(
    store: &ConfigStore,
    database: Option<PathBuf>,
    timeout_ms: Option<u64>,
    retries: Option<u32>,
) -> Result<ConsoleConfig> {
    let mut config = store.config();
    if database.is_none() && timeout_ms.is_none() && retries.is_none() {
        return Ok(config);
    }

    if let Some(path) = database {
        config.database_path = path;
    }
    if let Some(ms) = timeout_ms {
        config.request_timeout_ms = ms;
    }
    if let Some(rounds) = retries {
        config.propagation_retries = rounds;
    }
    store.update(config.clone())?;
    log::info!("Saved console configuration");
    Ok(config)
}

async fn dispatch(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::List => print_json(&commands::list_pickers(state).await),
        Command::Dashboard => {
            print_json(&commands::get_dashboard(state).await.map_err(Error::msg)?)
        }
        Command::Show { mobile } => {
            print_json(&commands::view_profile(state, mobile).await.map_err(Error::msg)?)
        }
        Command::Close => {
            commands::close_profile(state).await.map_err(Error::msg)?;
            println!("Profile closed");
            Ok(())
        }
        Command::Add {
            mobile,
            name,
            password,
            organization_id,
        } => {
            let input = NewPicker {
                mobile_number: mobile,
                name,
                password,
                organization_id,
            };
            print_json(&commands::add_picker(state, input).await.map_err(Error::msg)?)
        }
        Command::Edit {
            mobile,
            new_mobile,
            name,
            password,
        } => {
            let edit = ProfileEdit {
                mobile_number: new_mobile,
                name,
                password,
            };
            print_json(
                &commands::save_profile(state, mobile, edit)
                    .await
                    .map_err(Error::msg)?,
            )
        }
        Command::Delete { mobile } => {
            commands::delete_profile(state, mobile)
                .await
                .map_err(Error::msg)?;
            println!("Profile deleted");
            Ok(())
        }
        Command::Login { email, password } => {
            print_json(&commands::login(state, email, password).await.map_err(Error::msg)?)
        }
        Command::Logout => {
            commands::logout(state).await.map_err(Error::msg)?;
            println!("Logged out");
            Ok(())
        }
        Command::Settings => {
            print_json(&commands::get_global_setting(state).await.map_err(Error::msg)?)
        }
        Command::SetSkip { value } => print_json(
            &commands::set_global_setting(state, value)
                .await
                .map_err(Error::msg)?,
        ),
        Command::ToggleSkip => print_json(
            &commands::toggle_global_setting(state)
                .await
                .map_err(Error::msg)?,
        ),
        Command::Config {
            database,
            timeout_ms,
            retries,
        } => print_json(&configure(&state.config, database, timeout_ms, retries)?),
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    utils::logging::init_logging();

    log::info!("Picker console starting up...");

    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir().join("picker-console.json"));
    let config = ConfigStore::new(config_path)?;

    let command = cli.command.unwrap_or(Command::List);
    if let Command::Config {
        database,
        timeout_ms,
        retries,
    } = command
    {
        return print_json(&configure(&config, database, timeout_ms, retries)?);
    }

    let state = AppState::open(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(dispatch(&state, command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{error::ErrorKind, CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_and_bad_arguments_stop_before_startup() {
        let help = Cli::try_parse_from(["picker-console", "--help"]).err().unwrap();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let extra =
            Cli::try_parse_from(["picker-console", "add", "555", "Asha", "pw", "7", "extra"]);
        assert!(extra.is_err());

        let missing = Cli::try_parse_from(["picker-console", "show"]);
        assert!(missing.is_err());

        let unknown = Cli::try_parse_from(["picker-console", "frobnicate"]);
        assert!(unknown.is_err());
    }

    #[test]
    fn commands_parse_into_typed_arguments() {
        let cli = Cli::try_parse_from(["picker-console", "set-skip", "true"]).unwrap();
        assert!(matches!(cli.command, Some(Command::SetSkip { value: true })));

        assert!(Cli::try_parse_from(["picker-console", "set-skip", "maybe"]).is_err());

        let cli = Cli::try_parse_from(["picker-console", "add", "555", "Asha", "pw", "7"]).unwrap();
        match cli.command {
            Some(Command::Add {
                mobile,
                organization_id,
                ..
            }) => {
                assert_eq!(mobile, "555");
                assert_eq!(organization_id, "7");
            }
            _ => panic!("expected add"),
        }

        let cli = Cli::try_parse_from(["picker-console", "config", "--timeout-ms", "250"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                timeout_ms: Some(250),
                database: None,
                retries: None,
            })
        ));

        let cli = Cli::try_parse_from(["picker-console"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn configure_persists_only_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::new(path.clone()).unwrap();

        let shown = configure(&store, None, None, None).unwrap();
        assert_eq!(shown, ConsoleConfig::default());
        assert!(!path.exists());

        let saved = configure(&store, None, Some(250), Some(0)).unwrap();
        assert_eq!(saved.request_timeout_ms, 250);
        assert_eq!(saved.propagation_retries, 0);
        assert_eq!(ConfigStore::new(path).unwrap().config(), saved);
    }
}
