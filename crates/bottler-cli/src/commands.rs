//! Sub-commands.

use clap::Subcommand;

use bottler_axum::{DEFAULT_HOST, DEFAULT_PORT};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the JSON-RPC gateway
    Serve {
        /// Address to listen on
        #[arg(long, env = "BOTTLER_HOST", default_value = DEFAULT_HOST)]
        host: String,
        /// Port to listen on
        #[arg(short, long, env = "BOTTLER_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Comma-separated CORS origins; empty allows all
        #[arg(long, env = "BOTTLER_ALLOWED_ORIGINS", default_value = "")]
        allowed_origins: String,
    },

    /// Scan an executable's dependencies without installing anything
    Analyze {
        /// Path to the Windows executable
        program: String,
    },

    /// Score and list executable candidates in an environment
    Candidates {
        /// Environment name
        environment: String,
        /// Restrict the search to this directory under drive_c
        #[arg(long)]
        subpath: Option<String>,
        /// Number of candidates to keep
        #[arg(long = "top", short = 'n')]
        top: Option<usize>,
    },

    /// Show the detected toolchain and resolved prefix base
    Tools,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Cli;
    use clap::Parser;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["bottler", "serve"]);
        match cli.command {
            Some(Commands::Serve { host, port, .. }) => {
                assert_eq!(port, 8766);
                assert!(!host.is_empty());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_candidates_args() {
        let cli = Cli::parse_from(["bottler", "candidates", "game", "--subpath", "Game", "-n", "3"]);
        match cli.command {
            Some(Commands::Candidates {
                environment,
                subpath,
                top,
            }) => {
                assert_eq!(environment, "game");
                assert_eq!(subpath.as_deref(), Some("Game"));
                assert_eq!(top, Some(3));
            }
            _ => panic!("expected candidates"),
        }
    }
}
