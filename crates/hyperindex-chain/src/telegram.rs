//! Telegram alerts for pair address mismatches

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            chat_id,
        }
    }

    fn endpoint(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token)
    }

    /// Send an HTML-formatted message. Failures are logged, never returned:
    /// an alerting outage must not change the diagnostic's outcome.
    pub async fn send_message(&self, message: &str) {
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", message),
            ("parse_mode", "HTML"),
        ];

        let request = self
            .client
            .post(self.endpoint())
            .timeout(Duration::from_secs(10))
            .form(&params);

        match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!("Telegram notification sent");
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "Telegram API returned error");
            }
            Err(e) => {
                warn!(error = %e, "Failed to send Telegram notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let notifier = TelegramNotifier::new("123:abc".to_string(), "-100".to_string());
        assert_eq!(
            notifier.endpoint(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
