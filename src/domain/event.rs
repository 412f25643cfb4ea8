//! 入站事件实体
//!
//! 每个事件对应聊天平台的一条入站消息，处理完即丢弃。

use chrono::{DateTime, Utc};

use super::location::Location;

/// 聊天平台用户
#[derive(Debug, Clone, PartialEq)]
pub struct ChatUser {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

impl ChatUser {
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// 事件类别
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// `/start` 命令
    Start,
    /// `/help` 命令
    Help,
    /// 用户分享的位置
    Location(Location),
    /// 其他文本
    Unknown { text: String },
}

/// 入站事件
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingEvent {
    pub chat_id: i64,
    pub user: ChatUser,
    pub kind: EventKind,
}

impl IncomingEvent {
    pub fn new(chat_id: i64, user: ChatUser, kind: EventKind) -> Self {
        Self {
            chat_id,
            user,
            kind,
        }
    }

    /// 用于交互日志的动作描述
    pub fn action_label(&self) -> String {
        match &self.kind {
            EventKind::Start => "start command".to_string(),
            EventKind::Help => "help command".to_string(),
            EventKind::Location(location) => format!("shared location: {}", location),
            EventKind::Unknown { .. } => "sent unknown message".to_string(),
        }
    }

    /// 生成只写的交互记录
    pub fn interaction(&self) -> InteractionEvent {
        InteractionEvent {
            user_id: self.user.id,
            username: self.user.username.clone(),
            action: self.action_label(),
            timestamp: Utc::now(),
        }
    }
}

/// 交互记录，只用于日志输出
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    pub user_id: i64,
    pub username: Option<String>,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}
