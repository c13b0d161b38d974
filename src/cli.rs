use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::theme::ThemeVariant;

#[derive(Parser, Debug)]
#[command(name = "mastoradar")]
#[command(about = "A terminal client for MastoRadar timelines", long_about = None)]
pub struct Cli {
    /// Backend base URL (default: settings file, then http://127.0.0.1:8000)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// View name or route to open first, e.g. `live` or `/recommended`
    #[arg(long, value_name = "VIEW")]
    pub view: Option<String>,

    /// Force dark mode (overrides auto-detection)
    #[arg(long, conflicts_with = "light")]
    pub dark: bool,

    /// Force light mode (overrides auto-detection)
    #[arg(long, conflicts_with = "dark")]
    pub light: bool,

    /// Custom config directory (default: ~/.config/mastoradar)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Keep the credential in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Enable verbose logging (prints log path, sets DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in through the browser, or with a known token
    Login {
        /// Access token to store directly
        #[arg(
            long,
            conflicts_with = "callback_url",
            value_parser = clap::builder::NonEmptyStringValueParser::new()
        )]
        token: Option<String>,

        /// Redirect URL copied from the browser after authorizing
        #[arg(long, value_name = "URL")]
        callback_url: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Show who is logged in
    Status,
    /// Print one page of a timeline
    Timeline {
        /// View name or route
        view: String,

        /// Number of posts to request
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show or update the settings file
    Config {
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        #[arg(long, value_name = "PORT")]
        callback_port: Option<u16>,

        /// View name or route to open at startup
        #[arg(long, value_name = "VIEW")]
        default_view: Option<String>,

        #[arg(long)]
        theme: Option<ThemeVariant>,
    },
}
