//! TwiML reply envelope
//!
//! Twilio reads the webhook response body as TwiML and delivers each
//! `<Message>` back to the sender, so no REST call is needed to reply.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Result, WhatsAppError};

/// Longest body Twilio accepts for a WhatsApp message
pub const MAX_BODY_CHARS: usize = 1600;

/// Content type of a TwiML response
pub const CONTENT_TYPE: &str = "application/xml";

/// `<Response>` with no messages; Twilio sends nothing back
pub const EMPTY_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// `<Response>` with zero or more `<Message>` replies
#[derive(Debug, Default, Clone)]
pub struct MessagingResponse {
    messages: Vec<String>,
}

impl MessagingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reply message, truncated to [`MAX_BODY_CHARS`]
    pub fn message(mut self, body: impl AsRef<str>) -> Self {
        self.messages.push(truncate(body.as_ref(), MAX_BODY_CHARS));
        self
    }

    /// Render the TwiML document
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write(&mut writer, Event::Start(BytesStart::new("Response")))?;
        for body in &self.messages {
            write(&mut writer, Event::Start(BytesStart::new("Message")))?;
            write(&mut writer, Event::Start(BytesStart::new("Body")))?;
            write(&mut writer, Event::Text(BytesText::new(body)))?;
            write(&mut writer, Event::End(BytesEnd::new("Body")))?;
            write(&mut writer, Event::End(BytesEnd::new("Message")))?;
        }
        write(&mut writer, Event::End(BytesEnd::new("Response")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| WhatsAppError::Xml(e.to_string()))
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| WhatsAppError::Xml(e.to_string()))
}

/// Cut on a char boundary, marking the cut with an ellipsis
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_message() {
        let xml = MessagingResponse::new()
            .message("Please send a text to fact-check.")
            .to_xml()
            .unwrap();

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message><Body>\
             Please send a text to fact-check.</Body></Message></Response>"
        );
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(MessagingResponse::new().to_xml().unwrap(), EMPTY_RESPONSE);
    }

    #[test]
    fn test_body_is_escaped() {
        let xml = MessagingResponse::new()
            .message("❌ A & B <b>true</b>")
            .to_xml()
            .unwrap();

        assert!(xml.contains("<Body>❌ A &amp; B &lt;b&gt;true&lt;/b&gt;</Body>"));
    }

    #[test]
    fn test_escaped_body_reads_back_unchanged() {
        let body = "⚠️ \"Quoted\" & <tagged> isn't verified";
        let xml = MessagingResponse::new().message(body).to_xml().unwrap();

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut text = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Text(e) => text.push_str(&e.unescape().unwrap()),
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(text, body);
    }

    #[test]
    fn test_multiple_messages() {
        let xml = MessagingResponse::new()
            .message("one")
            .message("two")
            .to_xml()
            .unwrap();

        assert!(xml.ends_with(
            "<Message><Body>one</Body></Message><Message><Body>two</Body></Message></Response>"
        ));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let long = "⚠️".repeat(MAX_BODY_CHARS);
        let response = MessagingResponse::new().message(&long);

        let body = &response.messages[0];
        assert_eq!(body.chars().count(), MAX_BODY_CHARS);
        assert!(body.ends_with('…'));
    }

    #[test]
    fn test_short_body_untouched() {
        assert_eq!(truncate("✅ True.", 10), "✅ True.");
    }
}
