//! 日志模块 - 进程级日志设施、交互记录与 API 调用记录
//!
//! 特性：
//! - 每个进程只安装一次全局 subscriber，重复初始化不会产生重复输出
//! - 人类可读格式：`时间 - 名称 - 级别 - 消息`
//! - 敏感信息脱敏
//! - 外部调用耗时记录

use std::fmt;
use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{field, Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, FormattedFields, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    EnvFilter,
};
use uuid::Uuid;

use crate::domain::InteractionEvent;

/// 已安装的日志名称
static LOGGER_NAME: OnceLock<String> = OnceLock::new();

/// 日志格式类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// `时间 - 名称 - 级别 - 消息` 单行格式
    Pretty,
    /// tracing-subscriber 自带的紧凑格式
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志格式
    pub format: LogFormat,
    /// `RUST_LOG` 未设置时使用的级别
    pub level: String,
    /// 是否为级别着色
    pub enable_color: bool,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否显示文件名和行号
    pub show_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
            enable_color: std::io::stdout().is_terminal(),
            show_target: false,
            show_file: false,
        }
    }
}

impl LogConfig {
    /// 从环境变量读取配置，非法值回退到默认值
    ///
    /// # 环境变量
    /// - `LOG_FORMAT`: `pretty` / `compact`
    /// - `LOG_LEVEL`: `RUST_LOG` 未设置时的级别
    /// - `LOG_COLOR`: 是否着色，默认仅在终端输出时着色
    /// - `LOG_SHOW_TARGET` / `LOG_SHOW_FILE`: 显示目标模块 / 文件名和行号
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(format) = lookup("LOG_FORMAT").and_then(|v| v.parse::<LogFormat>().ok()) {
            config.format = format;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            if !level.trim().is_empty() {
                config.level = level.trim().to_lowercase();
            }
        }
        if let Some(color) = lookup("LOG_COLOR").and_then(|v| parse_flag(&v)) {
            config.enable_color = color;
        }
        if let Some(show) = lookup("LOG_SHOW_TARGET").and_then(|v| parse_flag(&v)) {
            config.show_target = show;
        }
        if let Some(show) = lookup("LOG_SHOW_FILE").and_then(|v| parse_flag(&v)) {
            config.show_file = show;
        }
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// 初始化结果
#[derive(Debug, Clone, PartialEq)]
pub enum LoggerInit {
    /// 本次调用安装了全局 subscriber
    Installed,
    /// 已经初始化过，本次调用未做任何事
    AlreadyInitialized { name: String },
}

/// 初始化日志系统
///
/// 同一进程内只会安装一次输出；之后的调用返回 [`LoggerInit::AlreadyInitialized`]。
///
/// # 环境变量
/// - `RUST_LOG`: 日志级别过滤，优先于 [`LogConfig::level`]
pub fn init(name: &str, config: LogConfig) -> LoggerInit {
    init_with_writer(name, config, std::io::stdout)
}

/// 初始化日志系统，输出写入 `writer`
///
/// 只有第一次成功的调用会使用传入的 `writer`。
pub fn init_with_writer<W>(name: &str, config: LogConfig, writer: W) -> LoggerInit
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let mut installed = false;
    let current = LOGGER_NAME.get_or_init(|| {
        let subscriber = build_subscriber(name, &config, writer);
        installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        name.to_string()
    });

    if installed {
        return LoggerInit::Installed;
    }
    if current != name {
        tracing::warn!(
            requested = %name,
            active = %current,
            "logger already initialized under another name"
        );
    }
    LoggerInit::AlreadyInitialized {
        name: current.clone(),
    }
}

/// 构建 subscriber，输出写入 `writer`
pub fn build_subscriber<W>(
    name: &str,
    config: &LogConfig,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(name, config.clone()))
                .fmt_fields(PrettyFields)
                .with_writer(writer);
            Box::new(registry.with(fmt_layer))
        }
        LogFormat::Compact => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(config.show_target)
                .with_file(config.show_file)
                .with_line_number(config.show_file)
                .with_ansi(config.enable_color)
                .with_writer(writer);
            Box::new(registry.with(fmt_layer))
        }
    }
}

/// 记录用户交互
pub fn log_interaction(user_id: i64, username: Option<&str>, action: &str) {
    let username = match username {
        Some(name) if !name.is_empty() => format!("@{}", name),
        _ => "Unknown".to_string(),
    };
    tracing::info!(
        target: "geofacts::interaction",
        "User {} ({}) performed action: {}",
        user_id,
        username,
        action
    );
}

/// 记录一条交互事件
pub fn record_interaction(event: &InteractionEvent) {
    log_interaction(event.user_id, event.username.as_deref(), &event.action);
}

/// 记录外部 API 调用结果：成功为 info，失败为 error
pub fn log_api_call(api_name: &str, success: bool, details: &str) {
    let status = if success { "SUCCESS" } else { "FAILED" };
    let mut message = format!("API call to {}: {}", api_name, status);
    if !details.is_empty() {
        message.push_str(" - ");
        message.push_str(details);
    }

    if success {
        tracing::info!(target: "geofacts::api", "{}", message);
    } else {
        tracing::error!(target: "geofacts::api", "{}", message);
    }
}

/// 为单个入站事件创建带请求 ID 的 span
pub fn event_span(user_id: i64) -> tracing::Span {
    tracing::info_span!("request", request_id = %Uuid::new_v4(), user_id)
}

/// 性能计时器 - 在 drop 时以 debug 级别记录耗时
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            target: "metrics",
            operation = %self.name,
            elapsed_ms = %format!("{:.2}", elapsed_ms),
            "operation completed"
        );
    }
}

/// 敏感信息脱敏工具
pub struct Sanitizer;

impl Sanitizer {
    /// 脱敏 API 密钥 - 只保留前 8 位和后 4 位
    pub fn api_key(key: &str) -> String {
        if key.len() <= 16 || !key.is_ascii() {
            return "***".to_string();
        }
        format!("{}...{}", &key[..8], &key[key.len() - 4..])
    }

    /// 脱敏 Telegram Bot Token - 只保留冒号前的 bot id
    pub fn bot_token(token: &str) -> String {
        match token.split_once(':') {
            Some((bot_id, secret)) if !bot_id.is_empty() && !secret.is_empty() => {
                format!("{}:***", bot_id)
            }
            _ => "***TOKEN***".to_string(),
        }
    }
}

/// `时间 - 名称 - 级别 - 消息` 格式器
pub struct PrettyFormatter {
    name: String,
    config: LogConfig,
}

impl PrettyFormatter {
    pub fn new(name: impl Into<String>, config: LogConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.name
        )?;

        let level = event.metadata().level();
        if self.config.enable_color {
            match *level {
                Level::ERROR => write!(writer, "\x1b[31mERROR\x1b[0m - ")?,
                Level::WARN => write!(writer, "\x1b[33mWARN\x1b[0m - ")?,
                Level::INFO => write!(writer, "\x1b[32mINFO\x1b[0m - ")?,
                Level::DEBUG => write!(writer, "\x1b[34mDEBUG\x1b[0m - ")?,
                Level::TRACE => write!(writer, "\x1b[35mTRACE\x1b[0m - ")?,
            }
        } else {
            write!(writer, "{} - ", level)?;
        }

        if self.config.show_target {
            write!(writer, "{} ", event.metadata().target())?;
        }

        if self.config.show_file {
            if let Some(file) = event.metadata().file() {
                write!(writer, "({}", file)?;
                if let Some(line) = event.metadata().line() {
                    write!(writer, ":{}", line)?;
                }
                write!(writer, ") ")?;
            }
        }

        // 所在 span 的字段（请求 ID 等）
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    let fields = fields.trim_start();
                    if !fields.is_empty() {
                        write!(writer, "[{}] ", fields)?;
                    }
                }
            }
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// 自定义字段格式化
pub struct PrettyFields;

impl FormatFields<'_> for PrettyFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: Writer<'_>,
        fields: R,
    ) -> std::fmt::Result {
        let mut visitor = FieldVisitor {
            writer,
            result: Ok(()),
        };
        fields.record(&mut visitor);
        visitor.result
    }
}

struct FieldVisitor<'a> {
    writer: Writer<'a>,
    result: std::fmt::Result,
}

impl field::Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.result = write!(self.writer, "{:?}", value);
        } else {
            self.result = write!(self.writer, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &field::Field, value: &str) {
        if field.name() == "message" {
            self.result = write!(self.writer, "{}", value);
        } else {
            self.result = write!(self.writer, " {}={}", field.name(), value);
        }
    }

    fn record_i64(&mut self, field: &field::Field, value: i64) {
        self.result = write!(self.writer, " {}={}", field.name(), value);
    }

    fn record_u64(&mut self, field: &field::Field, value: u64) {
        self.result = write!(self.writer, " {}={}", field.name(), value);
    }

    fn record_bool(&mut self, field: &field::Field, value: bool) {
        self.result = write!(self.writer, " {}={}", field.name(), value);
    }

    fn record_f64(&mut self, field: &field::Field, value: f64) {
        self.result = write!(self.writer, " {}={:.4}", field.name(), value);
    }
}
