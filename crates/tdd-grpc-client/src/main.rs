use clap::Parser;
use tdd_grpc_client::config::{CliArgs, ClientConfig};
use tdd_grpc_client::connection::Connection;
use tdd_grpc_client::driver::{self, Termination};
use tdd_grpc_client::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ClientConfig::try_from(args)?;

    init_telemetry()?;

    if cfg!(debug_assertions) {
        tracing::debug!("Starting client with full config: {:#?}", config);
    }

    // Dropping the connection on any early return releases the channel.
    let connection = Connection::open(&config.connection).await?;
    let report = driver::run(&connection, &config.calls).await?;
    tracing::info!(
        "Closing connection to {} ({:?})",
        connection.target(),
        connection.security()
    );
    connection.close();

    match report.stream.termination {
        Termination::Completed => tracing::info!(
            "Run finished: {} stream message(s), stream completed",
            report.stream.received
        ),
        Termination::Failed(ref e) => tracing::warn!(
            "Run finished: {} stream message(s), stream failed: {}",
            report.stream.received,
            e
        ),
    }

    Ok(())
}
