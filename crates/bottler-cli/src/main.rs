//! CLI entry point - the composition root.
//!
//! Loads `.env`, installs the tracing subscriber and dispatches to command
//! handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use bottler_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve {
            host,
            port,
            allowed_origins,
        } => handlers::serve::execute(cli.prefix_base, host, port, &allowed_origins).await,
        Commands::Analyze { program } => {
            let ctx = bootstrap(CliConfig::with_defaults().with_prefix_base(cli.prefix_base)).await?;
            handlers::analyze::execute(&ctx, &program).await.map(|_| ())
        }
        Commands::Candidates {
            environment,
            subpath,
            top,
        } => {
            let ctx = bootstrap(CliConfig::with_defaults().with_prefix_base(cli.prefix_base)).await?;
            handlers::candidates::execute(&ctx, &environment, subpath, top)
                .await
                .map(|_| ())
        }
        Commands::Tools => {
            let ctx = bootstrap(CliConfig::with_defaults().with_prefix_base(cli.prefix_base)).await?;
            handlers::tools::execute(&ctx)
        }
    }
}
