mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { force, minimal } => commands::init(&root, force, minimal).await,
        Commands::Import => commands::import(&root).await,
        Commands::List {
            archived,
            inactive,
            json,
        } => commands::list(&root, archived, inactive, json).await,
        Commands::Show { id, json } => commands::show(&root, id, json).await,
        Commands::Search { query } => commands::search(&root, &query).await,
        Commands::Run { ids, stdout } => commands::run(&root, &ids, stdout).await,
        Commands::Stats { id } => commands::stats(&root, id).await,
        Commands::History { id, limit } => commands::history(&root, id, limit).await,
        Commands::Delete { id } => commands::delete(&root, id).await,
    }
}
