//! Telegram Bot API 客户端
//!
//! 通过 reqwest 调用 `getUpdates` / `sendMessage` / `editMessageText`。
//! 上层只依赖 [`ChatTransport`]，测试中可替换为假实现。

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{Affordance, OutgoingMessage, SentMessage};
use crate::errors::{BotError, Result};

/// 默认 API 地址
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// 聊天平台出站接口
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// 发送消息，返回可用于编辑的引用
    async fn send_message(&self, chat_id: i64, message: &OutgoingMessage) -> Result<SentMessage>;

    /// 替换已发送消息的文本
    async fn edit_message(&self, sent: &SentMessage, text: &str) -> Result<()>;
}

/// Telegram 客户端
#[derive(Debug, Clone)]
pub struct TelegramClient {
    api_url: String,
    token: String,
    http: reqwest::Client,
}

/// Bot API 统一响应包装
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// 入站更新
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub chat: TgChat,
    pub from: Option<TgUser>,
    pub text: Option<String>,
    pub location: Option<TgLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TgLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ReplyKeyboardMarkup {
    keyboard: Vec<Vec<KeyboardButton>>,
    resize_keyboard: bool,
    one_time_keyboard: bool,
}

#[derive(Debug, Serialize)]
struct KeyboardButton {
    text: String,
    request_location: bool,
}

impl From<&Affordance> for ReplyKeyboardMarkup {
    fn from(affordance: &Affordance) -> Self {
        match affordance {
            Affordance::RequestLocation { label } => ReplyKeyboardMarkup {
                keyboard: vec![vec![KeyboardButton {
                    text: label.clone(),
                    request_location: true,
                }]],
                resize_keyboard: true,
                one_time_keyboard: true,
            },
        }
    }
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self::new_with_api_url(token, DEFAULT_API_URL.to_string())
    }

    /// 指定 API 地址（用于自建 Bot API 服务或测试）
    pub fn new_with_api_url(token: String, api_url: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Option<Duration>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Bot API 在 4xx 时同样返回 JSON 描述，这里不使用 error_for_status
        let res: ApiResponse<T> = request.send().await?.json().await?;

        if !res.ok {
            return Err(BotError::Telegram(format!(
                "{} failed ({}): {}",
                method,
                res.error_code.unwrap_or_default(),
                res.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        res.result
            .ok_or_else(|| BotError::Telegram(format!("{} returned no result", method)))
    }

    /// 长轮询获取更新
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message"],
        };
        self.call("getUpdates", &body, Some(long_poll_http_timeout(timeout_secs)))
            .await
    }
}

/// HTTP 超时需要比长轮询时间更长
fn long_poll_http_timeout(timeout_secs: u64) -> Duration {
    Duration::from_secs(timeout_secs.saturating_add(10))
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(&self, chat_id: i64, message: &OutgoingMessage) -> Result<SentMessage> {
        let body = SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.map(|mode| mode.as_str()),
            reply_markup: message.affordance.as_ref().map(ReplyKeyboardMarkup::from),
        };

        let sent: TgMessage = self.call("sendMessage", &body, None).await?;

        Ok(SentMessage {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    async fn edit_message(&self, sent: &SentMessage, text: &str) -> Result<()> {
        let body = EditMessageTextRequest {
            chat_id: sent.chat_id,
            message_id: sent.message_id,
            text,
        };

        let _: serde_json::Value = self.call("editMessageText", &body, None).await?;
        Ok(())
    }
}
