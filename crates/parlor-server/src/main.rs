//! Binary entry point: logging, bind address, serve.

use parlor_server::{ParlorServer, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr =
        std::env::var("PARLOR_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let server = ParlorServer::builder().bind(&addr).build().await?;
    tracing::info!(addr = %server.local_addr()?, "parlor ready");
    server.run().await
}
