//! Domain layer: message and credential types (no I/O).

mod message;
mod validation;
mod value;

pub use message::{Header, Message};
pub use validation::ValidationError;
pub use value::ServerToken;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_token_rejects_empty() {
        assert!(matches!(
            ServerToken::parse(""),
            Err(ValidationError::Empty {
                field: ServerToken::HEADER
            })
        ));
    }

    #[test]
    fn message_defaults_are_empty() {
        let message = Message::new();
        assert_eq!(message, Message::default());
        assert_eq!(message.recipient_count(), 0);
    }
}
