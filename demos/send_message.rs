use std::io;
use std::time::Duration;

use postmark::{Message, Server, ServerToken};
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
    let recipients = std::env::var("POSTMARK_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "POSTMARK_TO environment variable is required",
        )
    })?;

    let server = Server::builder(ServerToken::parse(token)?)
        .default_from(from)
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut message = Message::new().with_tag("demo");
    for recipient in recipients.split(',').map(str::trim) {
        message.append_to(recipient);
    }
    message.subject = "Example e-mail".to_owned();
    message.html_body = "<p>Hello there, this is an <b>example</b> e-mail!</p>".to_owned();
    message.text_body = "Hello there, this is an example e-mail!".to_owned();
    message.add_header("X-Demo", "send_message");

    match server.send(&message).await {
        Ok(()) => println!("sent to {} recipient(s)", message.recipient_count()),
        Err(err) if err.is_retryable() => eprintln!("temporary failure, try again later: {err}"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
