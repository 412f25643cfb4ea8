//! 交互路由器
//!
//! 负责两件事：
//! - 把 Telegram 更新归类为入站事件
//! - 逐个处理事件：回复、调用趣闻生成器、编辑“处理中”消息
//!
//! 路由器无状态，每个事件独立处理，可以并发执行。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn, Instrument};

use crate::application::fact::{FactGenerator, FactOutcome};
use crate::application::messages;
use crate::domain::{
    ChatUser, EventKind, IncomingEvent, Location, OutgoingMessage, ParseMode, SentMessage,
};
use crate::errors::{BotError, Result};
use crate::infrastructure::logger;
use crate::infrastructure::telegram::{ChatTransport, Update};

/// 把 Telegram 更新归类为事件
///
/// 未知命令、非文本非位置消息以及没有发送者的消息返回 `None`。
pub fn classify(update: &Update) -> Option<IncomingEvent> {
    let message = update.message.as_ref()?;
    let Some(from) = message.from.as_ref() else {
        debug!(update_id = update.update_id, "ignoring message without sender");
        return None;
    };

    let user = ChatUser {
        id: from.id,
        first_name: from.first_name.clone(),
        username: from.username.clone(),
    };

    let kind = if let Some(location) = message.location {
        EventKind::Location(Location::new(location.latitude, location.longitude))
    } else if let Some(text) = message.text.as_deref() {
        match parse_command(text) {
            Some("/start") => EventKind::Start,
            Some("/help") => EventKind::Help,
            Some(other) => {
                debug!(command = other, "ignoring unsupported command");
                return None;
            }
            None => EventKind::Unknown {
                text: text.to_string(),
            },
        }
    } else {
        debug!(update_id = update.update_id, "ignoring unsupported message type");
        return None;
    };

    Some(IncomingEvent::new(message.chat.id, user, kind))
}

/// 提取命令名，去掉 `@botname` 后缀和参数
fn parse_command(text: &str) -> Option<&str> {
    let token = text.trim_start().split_whitespace().next()?;
    if !token.starts_with('/') {
        return None;
    }
    token.split('@').next()
}

/// 交互路由器
pub struct InteractionRouter {
    transport: Arc<dyn ChatTransport>,
    facts: FactGenerator,
}

impl InteractionRouter {
    pub fn new(transport: Arc<dyn ChatTransport>, facts: FactGenerator) -> Self {
        Self { transport, facts }
    }

    /// 事件处理边界：任何错误或 panic 都在这里记录，不会传播给调用方
    pub async fn dispatch(&self, event: IncomingEvent) {
        let span = logger::event_span(event.user.id);

        async {
            match AssertUnwindSafe(self.handle(&event)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(error = %err, action = %event.action_label(), "failed to handle event");
                }
                Err(payload) => {
                    let err = BotError::Unexpected(panic_message(&*payload));
                    error!(error = %err, action = %event.action_label(), "event handler panicked");
                }
            }
        }
        .instrument(span)
        .await
    }

    /// 处理单个事件
    pub async fn handle(&self, event: &IncomingEvent) -> Result<()> {
        logger::record_interaction(&event.interaction());

        match &event.kind {
            EventKind::Start => self.handle_start(event.chat_id, &event.user).await,
            EventKind::Help => self.handle_help(event.chat_id).await,
            EventKind::Location(location) => self.handle_location(event.chat_id, *location).await,
            EventKind::Unknown { .. } => self.handle_unknown(event.chat_id).await,
        }
    }

    async fn handle_start(&self, chat_id: i64, user: &ChatUser) -> Result<()> {
        info!(user_id = user.id, "bot started by user");

        let reply = OutgoingMessage::text(messages::welcome(&user.first_name))
            .with_location_request(messages::SHARE_LOCATION_BUTTON);
        self.transport.send_message(chat_id, &reply).await?;
        Ok(())
    }

    async fn handle_help(&self, chat_id: i64) -> Result<()> {
        let reply = OutgoingMessage::text(messages::HELP).with_parse_mode(ParseMode::Markdown);
        self.transport.send_message(chat_id, &reply).await?;
        Ok(())
    }

    async fn handle_location(&self, chat_id: i64, location: Location) -> Result<()> {
        let ack = self
            .transport
            .send_message(chat_id, &OutgoingMessage::text(messages::SEARCHING))
            .await?;

        let outcome = AssertUnwindSafe(
            self.facts
                .generate_fact(location.latitude, location.longitude),
        )
        .catch_unwind()
        .await;

        match outcome {
            Ok(FactOutcome::Generated(fact)) => {
                if let Err(err) = self.deliver_fact(chat_id, &ack, fact.text()).await {
                    self.apologize(&ack).await;
                    return Err(err);
                }
            }
            Ok(FactOutcome::Failed(failure)) => {
                // 失败详情已由生成器以 error 级别记录
                info!(kind = ?failure.kind, "fact unavailable, sending apology");
                self.transport.edit_message(&ack, messages::APOLOGY).await?;
            }
            Err(payload) => {
                let err = BotError::Unexpected(panic_message(&*payload));
                error!(error = %err, "fact generation panicked");
                self.transport.edit_message(&ack, messages::APOLOGY).await?;
            }
        }

        Ok(())
    }

    async fn deliver_fact(&self, chat_id: i64, ack: &SentMessage, fact: &str) -> Result<()> {
        self.transport
            .edit_message(ack, &messages::fact_reply(fact))
            .await?;

        let follow_up = OutgoingMessage::text(messages::ASK_FOR_ANOTHER)
            .with_location_request(messages::SHARE_NEW_LOCATION_BUTTON);
        self.transport.send_message(chat_id, &follow_up).await?;
        Ok(())
    }

    /// 尽力把“处理中”消息改成道歉，失败只记录
    async fn apologize(&self, ack: &SentMessage) {
        if let Err(err) = self.transport.edit_message(ack, messages::APOLOGY).await {
            warn!(error = %err, "failed to deliver apology");
        }
    }

    async fn handle_unknown(&self, chat_id: i64) -> Result<()> {
        let reply = OutgoingMessage::text(messages::ONLY_LOCATION)
            .with_location_request(messages::SHARE_LOCATION_BUTTON);
        self.transport.send_message(chat_id, &reply).await?;
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: serde_json::Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    fn text_update(text: &str) -> Update {
        update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 3,
                "chat": {"id": 100},
                "from": {"id": 1, "is_bot": false, "first_name": "Alice", "username": "alice"},
                "text": text
            }
        }))
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some("/start"));
        assert_eq!(parse_command("/start@geofacts_bot"), Some("/start"));
        assert_eq!(parse_command("  /help please"), Some("/help"));
        assert_eq!(parse_command("hello /start"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_classify_commands() {
        let event = classify(&text_update("/start")).unwrap();
        assert_eq!(event.kind, EventKind::Start);
        assert_eq!(event.chat_id, 100);
        assert_eq!(event.user.first_name, "Alice");
        assert_eq!(event.user.username.as_deref(), Some("alice"));

        assert_eq!(classify(&text_update("/help")).unwrap().kind, EventKind::Help);
        assert!(classify(&text_update("/settings")).is_none());
    }

    #[test]
    fn test_classify_unknown_text() {
        let event = classify(&text_update("hello")).unwrap();
        assert_eq!(
            event.kind,
            EventKind::Unknown {
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_classify_location() {
        let event = classify(&update(serde_json::json!({
            "update_id": 2,
            "message": {
                "message_id": 4,
                "chat": {"id": 100},
                "from": {"id": 1, "first_name": "Alice"},
                "location": {"latitude": 55.7558, "longitude": 37.6176}
            }
        })))
        .unwrap();

        assert_eq!(event.kind, EventKind::Location(Location::new(55.7558, 37.6176)));
        assert!(event.user.username.is_none());
    }

    #[test]
    fn test_classify_ignored_updates() {
        assert!(classify(&update(serde_json::json!({"update_id": 5}))).is_none());

        // 图片等其他类型
        assert!(classify(&update(serde_json::json!({
            "update_id": 6,
            "message": {
                "message_id": 7,
                "chat": {"id": 100},
                "from": {"id": 1, "first_name": "Alice"}
            }
        })))
        .is_none());

        // 频道消息没有发送者
        assert!(classify(&update(serde_json::json!({
            "update_id": 8,
            "message": {"message_id": 9, "chat": {"id": -100}, "text": "hi"}
        })))
        .is_none());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }
}
