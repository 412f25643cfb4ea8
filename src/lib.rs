//! 地点趣闻机器人
//!
//! 用户在 Telegram 中分享位置，机器人请 LLM 讲述附近地点的一个趣闻并回复。
//!
//! # 架构分层
//!
//! - `domain`: 请求级实体（位置、趣闻、事件、出站消息）
//! - `infrastructure`: 外部系统交互（OpenAI、Telegram、日志）
//! - `application`: 业务编排（趣闻生成、事件路由、长轮询）
//! - `bootstrap`: 启动装配

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use application::fact::{FactGenerator, FactOutcome, FactSettings, Failure, FailureKind};
pub use application::router::{classify, InteractionRouter};
pub use application::runner::BotRunner;
pub use bootstrap::BotLauncher;
pub use config::AppConfig;
pub use errors::{BotError, Result};
pub use infrastructure::llm::{Completion, CompletionRequest, OpenAIClient, TextGenerator};
pub use infrastructure::logger;
pub use infrastructure::telegram::{ChatTransport, TelegramClient};

/// 进程日志名称
pub const PROCESS_NAME: &str = "telegram_bot";

/// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
