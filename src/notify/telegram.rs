use crate::errors::{AppError, Result};
use crate::notify::Notifier;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bot credentials and destination chat.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: Url,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url.as_str())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` client.
pub struct TelegramNotifier {
    http: reqwest::Client,
    endpoint: Url,
    chat_id: String,
    last_error: Mutex<Option<String>>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: send_message_url(&config.api_url, &config.bot_token)?,
            chat_id: config.chat_id.clone(),
            last_error: Mutex::new(None),
        })
    }

    fn record(&self, error: Option<String>) {
        *self.last_error.lock() = error;
    }

    /// Record a transport error as the last error and convert it.
    fn transport_failure(&self, e: reqwest::Error) -> AppError {
        // reqwest errors carry the URL, which contains the bot token
        let e = e.without_url();
        self.record(Some(e.to_string()));
        e.into()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<bool> {
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;
        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| self.transport_failure(e))?;

        match interpret_response(status.as_u16(), &raw) {
            Ok(()) => {
                self.record(None);
                Ok(true)
            }
            Err(reason) => {
                warn!(status = status.as_u16(), %reason, "[TELEGRAM] message refused");
                self.record(Some(reason));
                Ok(false)
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

fn send_message_url(api_url: &Url, bot_token: &str) -> Result<Url> {
    let mut url = api_url.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("TELEGRAM_API_URL cannot be a base: {api_url}")))?
        .pop_if_empty()
        .push(&format!("bot{bot_token}"))
        .push("sendMessage");
    Ok(url)
}

/// `Ok` when the API accepted the message, otherwise a readable reason.
fn interpret_response(status: u16, raw: &str) -> std::result::Result<(), String> {
    match serde_json::from_str::<ApiResponse>(raw) {
        Ok(resp) if resp.ok => Ok(()),
        Ok(resp) => Err(match (resp.error_code, resp.description) {
            (Some(code), Some(desc)) => format!("{code}: {desc}"),
            (None, Some(desc)) => desc,
            (Some(code), None) => format!("error code {code}"),
            (None, None) => format!("HTTP {status}"),
        }),
        Err(_) => Err(format!("HTTP {status}: unexpected response body")),
    }
}
