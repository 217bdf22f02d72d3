//! Floating WhatsApp contact link shown on the receipt page

use crate::rendering::markup::escape;

pub const DEFAULT_MESSAGE: &str = "Hello, I would like to chat!";

#[derive(Debug, Clone, PartialEq)]
pub struct WhatsAppLink {
    phone: String,
    message: String,
}

impl WhatsAppLink {
    pub fn new(phone: impl Into<String>) -> Self {
        Self { phone: phone.into(), message: DEFAULT_MESSAGE.to_string() }
    }

    /// Build a link from an optional configured phone number; blank means no link
    pub fn from_config(phone: Option<&str>) -> Option<Self> {
        phone.map(str::trim).filter(|p| !p.is_empty()).map(Self::new)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn url(&self) -> String {
        format!(
            "https://api.whatsapp.com/send?phone={}&text={}",
            urlencoding::encode(&self.phone),
            urlencoding::encode(&self.message)
        )
    }

    pub fn html(&self) -> String {
        format!(
            "<a class=\"whatsapp-link\" href=\"{}\" target=\"_blank\" \
             rel=\"noopener noreferrer\" aria-label=\"Chat on WhatsApp\">WhatsApp</a>",
            escape(&self.url())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_message() {
        let link = WhatsAppLink::new("15551234567");
        let url = link.url();
        assert!(url.starts_with("https://api.whatsapp.com/send?phone=15551234567&text="));
        assert!(url.contains("Hello%2C%20I%20would%20like%20to%20chat"));
    }

    #[test]
    fn blank_phone_means_no_link() {
        assert!(WhatsAppLink::from_config(None).is_none());
        assert!(WhatsAppLink::from_config(Some("  ")).is_none());
        assert!(WhatsAppLink::from_config(Some("1555")).is_some());
    }

    #[test]
    fn html_opens_in_new_tab() {
        let html = WhatsAppLink::new("1555").with_message("Hi & bye").html();
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains(r#"rel="noopener noreferrer""#));
        assert!(html.contains("text=Hi%20%26%20bye"));
        assert!(!html.contains("Hi & bye"));
    }
}
