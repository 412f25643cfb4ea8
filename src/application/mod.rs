//! 应用层：业务编排
//!
//! - `fact`: 坐标 → 提示词 → 趣闻
//! - `router`: 事件归类与处理
//! - `runner`: 长轮询与事件分发

pub mod fact;
pub mod messages;
pub mod router;
pub mod runner;
