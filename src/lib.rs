//! Typed Rust client for the Postmark transactional email HTTP API.
//!
//! The crate has three layers: a domain layer of plain message types, a
//! transport layer owning the JSON wire schema, and a small client layer that
//! issues one `POST /email` per send and maps the status code to a result.
//!
//! ```rust,no_run
//! use postmark::{Message, PostmarkError, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PostmarkError> {
//!     let server = Server::new("server-token");
//!
//!     server
//!         .send_simple_text("sender@example.com", "to@example.com", "Hello", "Hi there!")
//!         .await?;
//!
//!     let mut message = Message::new();
//!     message.from = "sender@example.com".to_owned();
//!     message.append_to("a@example.com");
//!     message.append_to("b@example.com");
//!     message.subject = "Report".to_owned();
//!     message.text_body = "See attached numbers.".to_owned();
//!     server.send(&message).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    BoxFuture, DEFAULT_ENDPOINT, HttpRequest, HttpResponse, HttpTransport,
    LEGACY_PLAINTEXT_ENDPOINT, PostmarkError, Server, ServerBuilder,
};
pub use domain::{Header, Message, ServerToken, ValidationError};
