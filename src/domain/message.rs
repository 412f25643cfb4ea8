//! 出站消息实体
//!
//! 与具体聊天平台无关的回复描述，由传输层负责转换为平台格式。

/// 文本解析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// 附加在回复上的交互按钮
#[derive(Debug, Clone, PartialEq)]
pub enum Affordance {
    /// 单按钮键盘，点击后分享用户位置
    RequestLocation { label: String },
}

/// 出站消息
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub affordance: Option<Affordance>,
}

impl OutgoingMessage {
    /// 纯文本消息
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            affordance: None,
        }
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    /// 附加“分享位置”按钮
    pub fn with_location_request(mut self, label: impl Into<String>) -> Self {
        self.affordance = Some(Affordance::RequestLocation {
            label: label.into(),
        });
        self
    }

    pub fn requests_location(&self) -> bool {
        matches!(self.affordance, Some(Affordance::RequestLocation { .. }))
    }
}

/// 已发送消息的引用，用于后续编辑
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i64,
}
