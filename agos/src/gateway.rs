//! Messaging-transport seam
//!
//! The transport itself (Twilio webhook, SMS aggregator, whatever) lives
//! outside this crate. It hands us `(sender, text)` and expects a reply
//! string back; this module carries the trait for that seam plus the
//! TwiML envelope Twilio-style webhooks wrap replies in.

use async_trait::async_trait;

/// Anything that can turn an inbound message into a reply.
///
/// [`crate::router::ConversationRouter`] is the production
/// implementation; transports depend on this trait, not on the router.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn reply_to(&self, sender: &str, text: &str) -> String;
}

#[async_trait]
impl MessagingGateway for crate::router::ConversationRouter {
    async fn reply_to(&self, sender: &str, text: &str) -> String {
        self.handle_message(sender, text).await
    }
}

/// Wrap reply text in a TwiML `<Response><Message>` envelope.
pub fn to_twiml(reply: &str) -> String {
    let escaped = reply.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>{escaped}</Message></Response>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twiml_wraps_and_escapes() {
        let xml = to_twiml("Rain < 40mm & rising");
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<Response><Message>"));
        assert!(xml.contains("Rain &lt; 40mm &amp; rising"));
        assert!(xml.ends_with("</Message></Response>"));
    }

    #[test]
    fn ampersand_escaped_first() {
        // "&lt;" in user text must not double-escape into "&amp;lt;"
        // the other way around
        let xml = to_twiml("<>");
        assert!(xml.contains("&lt;&gt;"));
    }
}
