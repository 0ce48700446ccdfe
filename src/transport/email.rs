use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::domain::Message;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Server-level fallbacks written into the payload when a message leaves the
/// field empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SenderDefaults<'a> {
    pub from: Option<&'a str>,
    pub reply_to: Option<&'a str>,
}

/// Body of `POST /email`. Every key is always emitted, even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EmailJson<'a> {
    #[serde(rename = "From")]
    from: Cow<'a, str>,
    #[serde(rename = "To")]
    to: Cow<'a, str>,
    #[serde(rename = "Cc")]
    cc: Cow<'a, str>,
    #[serde(rename = "Bcc")]
    bcc: Cow<'a, str>,
    #[serde(rename = "Tag")]
    tag: Cow<'a, str>,
    #[serde(rename = "Subject")]
    subject: Cow<'a, str>,
    #[serde(rename = "HtmlBody")]
    html_body: Cow<'a, str>,
    #[serde(rename = "TextBody")]
    text_body: Cow<'a, str>,
    #[serde(rename = "ReplyTo")]
    reply_to: Cow<'a, str>,
    #[serde(rename = "Headers")]
    headers: Vec<HeaderJson<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HeaderJson<'a> {
    #[serde(rename = "Name")]
    name: Cow<'a, str>,
    #[serde(rename = "Value")]
    value: Cow<'a, str>,
}

impl<'a> EmailJson<'a> {
    fn from_message(message: &'a Message, defaults: SenderDefaults<'a>) -> Self {
        Self {
            from: or_default(&message.from, defaults.from),
            to: Cow::Borrowed(&message.to),
            cc: Cow::Borrowed(&message.cc),
            bcc: Cow::Borrowed(&message.bcc),
            tag: Cow::Borrowed(&message.tag),
            subject: Cow::Borrowed(&message.subject),
            html_body: Cow::Borrowed(&message.html_body),
            text_body: Cow::Borrowed(&message.text_body),
            reply_to: or_default(&message.reply_to, defaults.reply_to),
            headers: message
                .headers
                .iter()
                .map(|header| HeaderJson {
                    name: Cow::Borrowed(&header.name),
                    value: Cow::Borrowed(&header.value),
                })
                .collect(),
        }
    }

    #[cfg(test)]
    fn into_message(self) -> Message {
        Message {
            from: self.from.into_owned(),
            to: self.to.into_owned(),
            cc: self.cc.into_owned(),
            bcc: self.bcc.into_owned(),
            tag: self.tag.into_owned(),
            subject: self.subject.into_owned(),
            html_body: self.html_body.into_owned(),
            text_body: self.text_body.into_owned(),
            reply_to: self.reply_to.into_owned(),
            headers: self
                .headers
                .into_iter()
                .map(|header| crate::domain::Header::new(header.name, header.value))
                .collect(),
        }
    }
}

fn or_default<'a>(value: &'a str, default: Option<&'a str>) -> Cow<'a, str> {
    match default {
        Some(default) if value.is_empty() => Cow::Borrowed(default),
        _ => Cow::Borrowed(value),
    }
}

pub fn encode_email_json(
    message: &Message,
    defaults: SenderDefaults<'_>,
) -> Result<Vec<u8>, TransportError> {
    let payload = EmailJson::from_message(message, defaults);
    Ok(serde_json::to_vec(&payload)?)
}

#[cfg(test)]
pub fn decode_email_json(json: &[u8]) -> Result<Message, TransportError> {
    let payload: EmailJson<'static> = serde_json::from_slice(json)?;
    Ok(payload.into_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_message() -> Message {
        let mut message = Message::simple(
            "sender@example.com",
            "a@example.com",
            "Quarterly \"report\"",
            "<p>Hello</p>",
            "Hello",
        )
        .with_tag("reports")
        .with_reply_to("reply@example.com");
        message.append_to("b@example.com");
        message.append_cc("cc@example.com");
        message.append_bcc("bcc@example.com");
        message.add_header("X-Priority", "1");
        message.add_header("X-Campaign", "q3");
        message
    }

    #[test]
    fn encode_emits_every_key_with_exact_casing() {
        let json = encode_email_json(&Message::new(), SenderDefaults::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "From": "",
                "To": "",
                "Cc": "",
                "Bcc": "",
                "Tag": "",
                "Subject": "",
                "HtmlBody": "",
                "TextBody": "",
                "ReplyTo": "",
                "Headers": []
            })
        );
    }

    #[test]
    fn encode_writes_headers_as_name_value_objects() {
        let json = encode_email_json(&full_message(), SenderDefaults::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();

        assert_eq!(value["To"], "a@example.com, b@example.com");
        assert_eq!(
            value["Headers"],
            serde_json::json!([
                { "Name": "X-Priority", "Value": "1" },
                { "Name": "X-Campaign", "Value": "q3" }
            ])
        );
    }

    #[test]
    fn decode_preserves_every_field() {
        let message = full_message();
        let json = encode_email_json(&message, SenderDefaults::default()).unwrap();

        assert_eq!(decode_email_json(&json).unwrap(), message);
    }

    #[test]
    fn defaults_fill_only_empty_fields() {
        let defaults = SenderDefaults {
            from: Some("default@example.com"),
            reply_to: Some("default-reply@example.com"),
        };

        let decoded =
            decode_email_json(&encode_email_json(&Message::new(), defaults).unwrap()).unwrap();
        assert_eq!(decoded.from, "default@example.com");
        assert_eq!(decoded.reply_to, "default-reply@example.com");

        let decoded =
            decode_email_json(&encode_email_json(&full_message(), defaults).unwrap()).unwrap();
        assert_eq!(decoded.from, "sender@example.com");
        assert_eq!(decoded.reply_to, "reply@example.com");
    }

    #[test]
    fn decode_rejects_missing_keys() {
        let err = decode_email_json(br#"{ "From": "a@example.com" }"#).unwrap_err();
        assert!(matches!(err, TransportError::Json(_)));
    }
}
