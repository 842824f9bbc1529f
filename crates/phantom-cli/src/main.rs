mod app;
mod shell;

use anyhow::Result;
use clap::Parser;
use phantom_infrastructure::PhantomPaths;
use tracing_subscriber::EnvFilter;

use crate::app::App;

/// Phantom Chat: a private, disappearing-messages chat client.
#[derive(Parser)]
#[command(name = "phantom", version, about)]
struct Cli {
    /// Store all application data under this directory instead of the
    /// platform config directory.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Override the Gemini model name.
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = match cli.data_dir {
        Some(dir) => PhantomPaths::with_root(dir),
        None => PhantomPaths::new()?,
    };
    tracing::debug!(root = %paths.root().display(), "data directory resolved");

    let app = App::bootstrap(paths, cli.model)?;
    app.run().await
}
