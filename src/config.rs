//! 运行配置
//!
//! 所有配置来自环境变量（可由 `.env` 文件提供）。缺少凭据属于致命错误。

use std::time::Duration;

use crate::errors::{BotError, Result};
use crate::infrastructure::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::infrastructure::logger::Sanitizer;
use crate::infrastructure::telegram::DEFAULT_API_URL;

pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// 必需的凭据变量
pub const REQUIRED_CREDENTIALS: [&str; 2] = [TELEGRAM_TOKEN, OPENAI_API_KEY];

/// 应用配置
#[derive(Clone)]
pub struct AppConfig {
    pub telegram_token: String,
    pub telegram_api_url: String,
    /// `getUpdates` 长轮询时间（秒）
    pub poll_timeout_secs: u64,

    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// 单次生成的超时，`None` 表示不限制
    pub fact_timeout: Option<Duration>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("telegram_token", &Sanitizer::bot_token(&self.telegram_token))
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("openai_api_key", &Sanitizer::api_key(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("fact_timeout", &self.fact_timeout)
            .finish()
    }
}

impl AppConfig {
    /// 从进程环境读取配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            value(key).ok_or_else(|| {
                BotError::Config(format!("{} not found in environment variables", key))
            })
        };

        let telegram_token = required(TELEGRAM_TOKEN)?;
        let openai_api_key = required(OPENAI_API_KEY)?;

        let fact_timeout_secs: u64 = parse_or(value("FACT_TIMEOUT_SECS"), "FACT_TIMEOUT_SECS", 60)?;
        let temperature: f32 = parse_or(value("OPENAI_TEMPERATURE"), "OPENAI_TEMPERATURE", 0.7)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(BotError::Config(format!(
                "OPENAI_TEMPERATURE must be within [0, 2], got {}",
                temperature
            )));
        }

        Ok(Self {
            telegram_token,
            telegram_api_url: value("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            poll_timeout_secs: parse_or(value("POLL_TIMEOUT_SECS"), "POLL_TIMEOUT_SECS", 30)?,
            openai_api_key,
            openai_base_url: value("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: value("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or(value("OPENAI_MAX_TOKENS"), "OPENAI_MAX_TOKENS", 300)?,
            temperature,
            fact_timeout: (fact_timeout_secs > 0).then(|| Duration::from_secs(fact_timeout_secs)),
        })
    }

    /// 检查各凭据是否存在（不校验其余配置）
    pub fn credential_status<F>(lookup: F) -> Vec<(&'static str, bool)>
    where
        F: Fn(&str) -> Option<String>,
    {
        REQUIRED_CREDENTIALS
            .iter()
            .map(|key| {
                let present = lookup(key).is_some_and(|v| !v.trim().is_empty());
                (*key, present)
            })
            .collect()
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| BotError::Config(format!("invalid {} value {:?}: {}", key, raw, e))),
    }
}
