//! Nestle - bottom sheet and swipe tabs, demoed in the terminal
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    match parse_args()? {
        Command::Run => nestle::app::run(),
        Command::Config => show_config(),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Run,
    Config,
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Run);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),
        "config" => Ok(Command::Config),
        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'nestle --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = nestle::Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
🪺 Nestle - bottom sheet and swipe tabs for a social feed

USAGE:
    nestle                             Launch TUI
    nestle [COMMAND]

COMMANDS:
    config                             Print config path and values

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Feed
      j/↓ k/↑       Move selection
      m/Enter       Open post menu
      r             Refresh

    Sheet
      Esc           Close
      h/l ←/→       Previous/next tab
      1-3           Jump to tab
      Mouse drag    Drag sheet / swipe tabs

    Actions
      L / R / S     Like / repost / save
      t             Change theme
      q             Quit

CONFIG:
    {}
"#,
        nestle::LOGO,
        config_path
    );
}

fn print_version() {
    println!("nestle {}", nestle::VERSION);
}

fn show_config() -> Result<()> {
    let path = nestle::Config::default_path()?;
    let config = nestle::Config::load()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
