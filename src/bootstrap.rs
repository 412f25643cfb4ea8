//! # Bootstrap
//!
//! Wires configuration, clients, router and runner together. Clients are
//! constructed here once and passed down explicitly.

use std::sync::Arc;
use tracing::info;

use crate::application::fact::{FactGenerator, FactSettings};
use crate::application::router::InteractionRouter;
use crate::application::runner::BotRunner;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::infrastructure::llm::OpenAIClient;
use crate::infrastructure::logger::Sanitizer;
use crate::infrastructure::telegram::TelegramClient;

/// Bot launcher
pub struct BotLauncher {
    config: AppConfig,
}

impl BotLauncher {
    /// Create a launcher from process environment
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            config: AppConfig::from_env()?,
        })
    }

    /// Create a launcher with explicit configuration
    pub fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build clients, register handlers and return a ready runner
    pub fn build(&self) -> BotRunner {
        let cfg = &self.config;

        info!(
            model = %cfg.openai_model,
            openai_key = %Sanitizer::api_key(&cfg.openai_api_key),
            telegram_token = %Sanitizer::bot_token(&cfg.telegram_token),
            "Initializing clients"
        );

        let llm = OpenAIClient::new_with_base_url(
            cfg.openai_api_key.clone(),
            cfg.openai_model.clone(),
            cfg.openai_base_url.clone(),
        );
        let telegram = Arc::new(TelegramClient::new_with_api_url(
            cfg.telegram_token.clone(),
            cfg.telegram_api_url.clone(),
        ));

        let facts = FactGenerator::new(Arc::new(llm), FactSettings::from(cfg));
        let router = Arc::new(InteractionRouter::new(telegram.clone(), facts));

        info!("Bot handlers registered successfully");

        BotRunner::new(telegram, router, cfg.poll_timeout_secs)
    }

    /// Build and poll until ctrl+c
    pub async fn launch(&self) {
        info!("Starting Telegram bot...");
        self.build().run().await;
    }
}
