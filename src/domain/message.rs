const RECIPIENT_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Custom SMTP header attached to a [`Message`].
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Outbound e-mail.
///
/// Every text field is a plain string where empty means "unset". Recipient
/// fields hold comma-separated address lists; addresses are neither validated
/// nor deduplicated.
pub struct Message {
    /// Sender address.
    pub from: String,
    /// Comma-separated recipient addresses.
    pub to: String,
    /// Comma-separated CC addresses.
    pub cc: String,
    /// Comma-separated BCC addresses.
    pub bcc: String,
    /// Tag used to categorize outgoing e-mail.
    pub tag: String,
    pub subject: String,
    /// Body in `text/html` format.
    pub html_body: String,
    /// Body in `text/plain` format.
    pub text_body: String,
    /// Reply-to address.
    pub reply_to: String,
    pub headers: Vec<Header>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a message with a single recipient and both bodies set.
    pub fn simple(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: text_body.into(),
            ..Self::default()
        }
    }

    /// Add a recipient to `to`.
    pub fn append_to(&mut self, recipient: &str) {
        append_address(&mut self.to, recipient);
    }

    /// Add a recipient to `cc`.
    pub fn append_cc(&mut self, recipient: &str) {
        append_address(&mut self.cc, recipient);
    }

    /// Add a recipient to `bcc`.
    pub fn append_bcc(&mut self, recipient: &str) {
        append_address(&mut self.bcc, recipient);
    }

    /// Append a custom header; order is preserved on the wire.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push(Header::new(name, value));
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = reply_to.into();
        self
    }

    /// Number of entries in `to`, `cc` and `bcc` combined.
    pub fn recipient_count(&self) -> usize {
        [&self.to, &self.cc, &self.bcc]
            .into_iter()
            .flat_map(|field| field.split(RECIPIENT_SEPARATOR))
            .filter(|address| !address.is_empty())
            .count()
    }
}

fn append_address(field: &mut String, recipient: &str) {
    if !field.is_empty() {
        field.push_str(RECIPIENT_SEPARATOR);
    }
    field.push_str(recipient);
}
