//! 标准化错误处理
//!
//! 定义项目专用的错误类型

use thiserror::Error;

/// 项目主要错误类型
#[derive(Error, Debug)]
pub enum BotError {
    /// 配置错误（缺少凭据等），启动阶段致命
    #[error("Configuration error: {0}")]
    Config(String),

    /// 输入验证错误
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 文本生成服务错误
    #[error("LLM service error: {0}")]
    Llm(String),

    /// Telegram Bot API 返回的错误
    #[error("Telegram API error: {0}")]
    Telegram(String),

    /// 网络请求错误
    #[error("Network error: {0}")]
    Network(String),

    /// 事件处理中的意外错误
    #[error("Unexpected handler error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Telegram(format!("malformed response: {}", err))
    }
}

impl From<async_openai::error::OpenAIError> for BotError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        BotError::Llm(err.to_string())
    }
}

/// 项目结果类型别名
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BotError::Config("TELEGRAM_TOKEN not found".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: TELEGRAM_TOKEN not found"
        );

        let err = BotError::Llm("quota exceeded".to_string());
        assert_eq!(err.to_string(), "LLM service error: quota exceeded");
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BotError = parse_err.into();
        assert!(matches!(err, BotError::Telegram(_)));
    }
}
