//! 测试通用工具
//!
//! 提供假的文本生成服务、假的聊天传输层以及日志捕获

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use geofacts::domain::{OutgoingMessage, SentMessage};
use geofacts::logger::{self, LogConfig};
use geofacts::{BotError, ChatTransport, Completion, CompletionRequest, Result, TextGenerator};
use tracing_subscriber::fmt::MakeWriter;

/// 假生成服务的行为
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail(String),
    Panic,
    Hang,
}

/// 假的文本生成服务，记录调用次数和最后一次请求
pub struct FakeGenerator {
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl FakeGenerator {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Behavior::Reply(text.to_string()))
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Self::new(Behavior::Fail(reason.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: &CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.behavior {
            Behavior::Reply(text) => Ok(Completion {
                text: text.clone(),
                tokens_used: Some(150),
            }),
            Behavior::Fail(reason) => Err(BotError::Llm(reason.clone())),
            Behavior::Panic => panic!("generator exploded"),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("hang should be cut by the timeout")
            }
        }
    }
}

/// 传输层收到的调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send { chat_id: i64, message: OutgoingMessage },
    Edit { message_id: i64, text: String },
}

/// 假的聊天传输层，记录所有出站调用
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    fail: bool,
    failing_edits: AtomicUsize,
    edit_attempts: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 所有调用都返回错误
    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// 前 `count` 次编辑返回限流错误，之后正常
    pub fn failing_edits(count: usize) -> Arc<Self> {
        Arc::new(Self {
            failing_edits: AtomicUsize::new(count),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn edit_attempts(&self) -> usize {
        self.edit_attempts.load(Ordering::SeqCst)
    }

    /// 用户最终看到的各条消息文本（编辑会覆盖原消息）
    pub fn visible_texts(&self) -> Vec<String> {
        let mut messages: Vec<(i64, String)> = Vec::new();
        let mut next_id = 0;
        for call in self.calls() {
            match call {
                Call::Send { message, .. } => {
                    next_id += 1;
                    messages.push((next_id, message.text));
                }
                Call::Edit { message_id, text } => {
                    if let Some(entry) = messages.iter_mut().find(|(id, _)| *id == message_id) {
                        entry.1 = text;
                    }
                }
            }
        }
        messages.into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_message(&self, chat_id: i64, message: &OutgoingMessage) -> Result<SentMessage> {
        if self.fail {
            return Err(BotError::Telegram("sendMessage failed (502): Bad Gateway".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Send {
            chat_id,
            message: message.clone(),
        });
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    async fn edit_message(&self, sent: &SentMessage, text: &str) -> Result<()> {
        self.edit_attempts.fetch_add(1, Ordering::SeqCst);
        let rate_limited = self
            .failing_edits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if rate_limited {
            return Err(BotError::Telegram(
                "editMessageText failed (429): Too Many Requests".to_string(),
            ));
        }
        if self.fail {
            return Err(BotError::Telegram("editMessageText failed (502): Bad Gateway".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Edit {
            message_id: sent.message_id,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// 捕获日志输出的 writer
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// 含有指定级别标记的行
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let marker = format!(" - {} - ", level);
        self.lines()
            .into_iter()
            .filter(|line| line.contains(&marker))
            .collect()
    }
}

pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(self.0.clone())
    }
}

/// 在当前线程安装捕获日志的 subscriber（不着色）
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    capture_logs_with(LogConfig {
        enable_color: false,
        ..LogConfig::default()
    })
}

pub fn capture_logs_with(config: LogConfig) -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = logger::build_subscriber("test_bot", &config, logs.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
