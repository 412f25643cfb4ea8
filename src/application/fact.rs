//! 趣闻生成
//!
//! 根据坐标构造提示词并调用文本生成服务。失败作为普通结果返回，
//! 调用方通过 [`FactOutcome`] 穷尽匹配处理。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::domain::{Fact, Location};
use crate::infrastructure::llm::{CompletionRequest, TextGenerator};
use crate::infrastructure::logger::{self, Timer};

/// 默认系统提示词
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Ты эксперт по истории и географии, который рассказывает интересные факты о местах.";

/// 搜索半径（公里）
pub const SEARCH_RADIUS_KM: u32 = 3;

/// 生成参数
#[derive(Debug, Clone)]
pub struct FactSettings {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl Default for FactSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 300,
            temperature: 0.7,
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl From<&AppConfig> for FactSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.fact_timeout,
            ..Self::default()
        }
    }
}

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 坐标超出范围，未调用服务
    InvalidInput,
    /// 服务调用失败（网络、配额、响应格式）
    Service,
    /// 服务返回了空文本
    EmptyResponse,
    /// 超过生成超时
    Timeout,
    /// 生成过程中出现意外错误
    Unexpected,
}

/// 生成失败
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub reason: String,
}

impl Failure {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.reason)
    }
}

/// 生成结果：要么是趣闻，要么是失败，二者互斥
#[derive(Debug, Clone, PartialEq)]
pub enum FactOutcome {
    Generated(Fact),
    Failed(Failure),
}

impl FactOutcome {
    pub fn fact(&self) -> Option<&Fact> {
        match self {
            FactOutcome::Generated(fact) => Some(fact),
            FactOutcome::Failed(_) => None,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, FactOutcome::Generated(_))
    }
}

/// 构造包含坐标的提示词
pub fn build_prompt(location: &Location) -> String {
    format!(
        "Координаты: {lat}, {lon}\n\n\
         Найди интересное и необычное место не далее, чем в {radius} км от этих координат.\n\
         Расскажи один увлекательный исторический факт, легенду или любопытную особенность об этом месте.\n\n\
         Требования к ответу:\n\
         - Ответ должен быть на русском языке\n\
         - Длина 2-4 предложения\n\
         - Начни с названия места\n\
         - Сделай рассказ интересным и познавательным\n\
         - Если точного места нет, расскажи о ближайшем городе или регионе\n\n\
         Пример формата ответа:\n\
         \"🏛️ Московский Кремль: Знаете ли вы, что...\"",
        lat = location.latitude,
        lon = location.longitude,
        radius = SEARCH_RADIUS_KM,
    )
}

/// 趣闻生成器
///
/// 只持有不可变状态，可在多个事件间共享。
#[derive(Clone)]
pub struct FactGenerator {
    llm: Arc<dyn TextGenerator>,
    settings: FactSettings,
}

impl FactGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>, settings: FactSettings) -> Self {
        Self { llm, settings }
    }

    pub fn settings(&self) -> &FactSettings {
        &self.settings
    }

    /// 为坐标生成趣闻
    pub async fn generate_fact(&self, latitude: f64, longitude: f64) -> FactOutcome {
        let location = Location::new(latitude, longitude);
        if let Err(err) = location.validate() {
            warn!(error = %err, "rejected coordinates");
            return FactOutcome::Failed(Failure::new(FailureKind::InvalidInput, err.to_string()));
        }

        let request = CompletionRequest {
            system: self.settings.system_prompt.clone(),
            user: build_prompt(&location),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let outcome = self.call_service(&request).await;
        let api_name = self.llm.name();

        match &outcome {
            FactOutcome::Generated(fact) => {
                debug!(tokens_used = ?fact.tokens_used(), "fact generated");
                logger::log_api_call(
                    api_name,
                    true,
                    &format!("Generated fact for coordinates {}", location),
                );
            }
            FactOutcome::Failed(failure) => {
                logger::log_api_call(api_name, false, &format!("Error: {}", failure));
            }
        }

        outcome
    }

    async fn call_service(&self, request: &CompletionRequest) -> FactOutcome {
        let _timer = Timer::new("text_generation");

        let result = match self.settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.llm.generate(request)).await {
                Ok(result) => result,
                Err(_) => {
                    return FactOutcome::Failed(Failure::new(
                        FailureKind::Timeout,
                        format!("no response within {}s", limit.as_secs_f64()),
                    ))
                }
            },
            None => self.llm.generate(request).await,
        };

        match result {
            Ok(completion) => match Fact::new(completion.text, completion.tokens_used) {
                Some(fact) => FactOutcome::Generated(fact),
                None => FactOutcome::Failed(Failure::new(
                    FailureKind::EmptyResponse,
                    "service returned empty text",
                )),
            },
            Err(err) => FactOutcome::Failed(Failure::new(FailureKind::Service, err.to_string())),
        }
    }
}
