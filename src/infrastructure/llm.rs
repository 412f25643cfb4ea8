//! LLM 客户端
//!
//! 使用 async-openai 提供与 OpenAI API 的交互能力。
//! 上层只依赖 [`TextGenerator`]，测试中可替换为假实现。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::errors::{BotError, Result};

/// 默认 API 地址
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// 默认模型
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// 一次文本生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// 文本生成结果
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: Option<u32>,
}

/// 文本生成服务接口
///
/// 实现必须可以被多个事件并发调用。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &CompletionRequest) -> Result<Completion>;

    /// 用于日志的服务名称
    fn name(&self) -> &str {
        "OpenAI"
    }
}

/// OpenAI 客户端
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    /// 使用默认 API 地址创建客户端
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    /// 创建指定 API 地址的客户端
    pub fn new_with_base_url(api_key: String, model: String, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        let client = Client::with_config(config);

        Self { client, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<Completion> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.clone())
                .build()
                .map(ChatCompletionRequestMessage::System)?,
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user.clone())
                .build()
                .map(ChatCompletionRequestMessage::User)?,
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()?;

        let response = self.client.chat().create(chat_request).await?;

        let tokens_used = response.usage.as_ref().map(|usage| usage.total_tokens);
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BotError::Llm("response contained no message content".to_string()))?;

        Ok(Completion { text, tokens_used })
    }
}
