use anyhow::Context as _;

pub fn init() -> anyhow::Result<()> {
    // Booking sites trip a lot of dependency noise at info level; keep
    // everything but this crate at warn unless RUST_LOG overrides it.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn,staycapture=info"))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
