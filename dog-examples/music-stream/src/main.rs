use anyhow::Result;
use music_stream::{build, StreamSettings, DEFAULT_LOG_FILTER};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let settings = StreamSettings::from_env();
    let ax = build(&settings)?;

    let addr = settings.addr();
    println!("[music-stream] listening on http://{addr}");

    ax.listen(addr).await?;

    Ok(())
}
