//! 地理位置与趣闻实体

use serde::{Deserialize, Serialize};

use crate::errors::{BotError, Result};

/// 纬度合法范围
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// 经度合法范围
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// 用户分享的地理位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// 校验坐标是否在标准地理范围内
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !LATITUDE_RANGE.contains(&self.latitude) {
            return Err(BotError::InvalidInput(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !LONGITUDE_RANGE.contains(&self.longitude) {
            return Err(BotError::InvalidInput(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// 为某个位置生成的趣闻
///
/// 文本保证非空，发送后即丢弃。
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    text: String,
    tokens_used: Option<u32>,
}

impl Fact {
    /// 创建趣闻，空白文本返回 `None`
    pub fn new(text: impl Into<String>, tokens_used: Option<u32>) -> Option<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return None;
        }
        Some(Self { text, tokens_used })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens_used(&self) -> Option<u32> {
        self.tokens_used
    }
}
