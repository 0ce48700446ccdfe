//! Transport layer: wire-format details of the Postmark API (serialization only).

mod email;

#[cfg(test)]
pub use email::decode_email_json;
pub use email::{SenderDefaults, TransportError, encode_email_json};
