use clap::Parser;
use tracing_subscriber::EnvFilter;

use dirprobe::cli::{self, Cli};

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so stdout stays pipeable result lines.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = cli::run(cli).await;
    std::process::exit(code);
}
