//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Terminal UI for the openvpn3-linux session manager
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding config.toml, saved usernames and logs
    #[arg(long, env = "OVPN3_TUI_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Diagnostics filter, e.g. "debug" or "ovpn3_tui=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute; the TUI starts when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List profiles and their sessions
    List,
    /// Import an .ovpn profile
    Import {
        /// Path to the .ovpn file
        file: String,
        /// Profile name (defaults to the file name without extension)
        #[arg(long)]
        name: Option<String>,
    },
    /// Disconnect a profile's session and remove the profile
    Remove {
        name: String,
    },
    /// Disconnect one profile's session, or every session
    Disconnect {
        /// Profile name; all sessions when omitted
        name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs_tui() {
        let args = Args::try_parse_from(["ovpn3-tui"]).unwrap();
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_import_with_name() {
        let args =
            Args::try_parse_from(["ovpn3-tui", "import", "~/vpn/a.ovpn", "--name", "Lab"]).unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Import {
                file: "~/vpn/a.ovpn".to_string(),
                name: Some("Lab".to_string()),
            })
        );
    }

    #[test]
    fn test_global_config_dir_after_subcommand() {
        let args =
            Args::try_parse_from(["ovpn3-tui", "disconnect", "--config-dir", "/tmp/x"]).unwrap();
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(args.command, Some(Commands::Disconnect { name: None }));
    }
}
