//! 长轮询运行器
//!
//! 循环调用 `getUpdates`，把每个事件交给独立的 tokio 任务处理。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::router::{classify, InteractionRouter};
use crate::infrastructure::telegram::TelegramClient;

/// 轮询失败后的暂停时间
pub const POLL_ERROR_PAUSE: Duration = Duration::from_secs(3);

/// 机器人运行器
pub struct BotRunner {
    telegram: Arc<TelegramClient>,
    router: Arc<InteractionRouter>,
    poll_timeout_secs: u64,
    error_pause: Duration,
}

impl BotRunner {
    pub fn new(
        telegram: Arc<TelegramClient>,
        router: Arc<InteractionRouter>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            telegram,
            router,
            poll_timeout_secs,
            error_pause: POLL_ERROR_PAUSE,
        }
    }

    /// 设置轮询失败后的暂停时间
    pub fn with_error_pause(mut self, pause: Duration) -> Self {
        self.error_pause = pause;
        self
    }

    /// 运行直到收到 Ctrl-C
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for ctrl+c");
                std::future::pending::<()>().await;
            }
        })
        .await;
    }

    /// 运行直到 `shutdown` 完成，返回已分发的事件数
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;
        let mut dispatched = 0;

        info!("Bot is starting polling...");

        loop {
            let updates = tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal, stopping polling");
                    break;
                }
                result = self.telegram.get_updates(offset, self.poll_timeout_secs) => result,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(err) => {
                    warn!(error = %err, "polling failed, pausing before next attempt");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.error_pause) => continue,
                    }
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);

                let Some(event) = classify(&update) else {
                    continue;
                };

                debug!(update_id = update.update_id, "dispatching event");
                let router = Arc::clone(&self.router);
                tokio::spawn(async move {
                    router.dispatch(event).await;
                });
                dispatched += 1;
            }
        }

        dispatched
    }
}
