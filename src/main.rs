use clap::Parser;
use pseudodhcp::{scenario, Args, Session};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::debug!("{:?}", args);

    let mut session = Session::new(&args.session_config());
    scenario::sample(&mut session, &args.connection_config())?;
    session.save(&args.output).await?;

    Ok(())
}
