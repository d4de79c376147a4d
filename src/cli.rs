use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture reservations from one booking-site page.
    Capture(CaptureArgs),
    /// Watch a page snapshot and re-capture whenever it changes.
    Watch(WatchArgs),
    /// Re-send stored reservations to the sync server.
    Sync(SyncArgs),
    /// Store the sync token and server base url.
    Config(ConfigArgs),
    /// List the supported booking channels.
    Channels,
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Page url. Selects the channel profile and is recorded on each reservation.
    #[arg(long)]
    pub url: String,

    /// Saved page snapshot to read instead of fetching the url.
    #[arg(long)]
    pub page: Option<String>,

    /// Capture store file.
    #[arg(long, default_value = "capture-store.json")]
    pub store: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Page url. Selects the channel profile and is recorded on each reservation.
    #[arg(long)]
    pub url: String,

    /// Page snapshot file to watch for re-renders.
    #[arg(long)]
    pub page: String,

    /// Capture store file.
    #[arg(long, default_value = "capture-store.json")]
    pub store: String,

    /// Delay before the first capture attempt, so async content can render.
    #[arg(long, default_value_t = 3000)]
    pub settle_ms: u64,

    /// Debounce window for page-change notifications.
    #[arg(long, default_value_t = 500)]
    pub debounce_ms: u64,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Capture store file.
    #[arg(long, default_value = "capture-store.json")]
    pub store: String,

    /// Only send reservations captured from this channel.
    #[arg(long)]
    pub channel: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Capture store file.
    #[arg(long, default_value = "capture-store.json")]
    pub store: String,

    /// Authorization token issued by the sync server.
    #[arg(long)]
    pub token: Option<String>,

    /// Sync server base url.
    #[arg(long)]
    pub base_url: Option<String>,
}
