use clap::Parser;
use dotenv::dotenv;

use hbase_browser::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Logs go to stderr so they never mix with command output
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hbase_browser=warn".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    cli::run(Cli::parse()).await
}
