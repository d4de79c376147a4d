use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    staycapture::logging::init().context("init logging")?;

    let cli = staycapture::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        staycapture::cli::Command::Capture(args) => {
            staycapture::capture::run(args).await.context("capture")?;
        }
        staycapture::cli::Command::Watch(args) => {
            staycapture::observe::run(args).await.context("watch")?;
        }
        staycapture::cli::Command::Sync(args) => {
            staycapture::sync::run(args).await.context("sync")?;
        }
        staycapture::cli::Command::Config(args) => {
            staycapture::store::configure(args).context("config")?;
        }
        staycapture::cli::Command::Channels => {
            staycapture::channels::list();
        }
    }

    Ok(())
}
