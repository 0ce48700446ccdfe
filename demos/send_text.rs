use std::io;

use postmark::Server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let token = std::env::var("POSTMARK_SERVER_TOKEN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "POSTMARK_SERVER_TOKEN environment variable is required",
        )
    })?;
    let from = std::env::var("POSTMARK_FROM").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "POSTMARK_FROM environment variable is required",
        )
    })?;
    let to = std::env::var("POSTMARK_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "POSTMARK_TO environment variable is required",
        )
    })?;

    let server = Server::try_new(token)?;
    server
        .send_simple_text(
            &from,
            &to,
            "Example e-mail",
            "Hello there, this is an example e-mail!",
        )
        .await?;

    println!("sent");
    Ok(())
}
