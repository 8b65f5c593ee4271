//! Carpool API server binary.

use carpool_api::config::Config;
use carpool_api::server::Server;
use carpool_core::observability::{LogFormat, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let format = if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    };
    init_logging(format);

    let server = Server::new(config);
    server.serve().await?;

    Ok(())
}
