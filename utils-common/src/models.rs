use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 卡片与详情页在缺少配图时使用的占位图
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// 卡片上最多展示的标签数量
pub const PREVIEW_TAG_LIMIT: usize = 3;

// 只认开头的整数部分，后面的 "min read" 等文字忽略
static READ_TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)").expect("read time pattern is valid"));

/// 阅读时长解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadTimeError {
    #[error("阅读时长缺少开头的数字: {0:?}")]
    MissingMinutes(String),
    #[error("阅读时长超出范围: {0:?}")]
    OutOfRange(String),
}

/// 阅读时长 - 保留原始文案用于展示，开头的整数用于排序
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReadTime {
    minutes: u32,
    label: String,
}

impl ReadTime {
    /// 从 "8 min read" 这样的文案解析
    pub fn parse(label: &str) -> Result<Self, ReadTimeError> {
        let caps = READ_TIME_PATTERN
            .captures(label)
            .ok_or_else(|| ReadTimeError::MissingMinutes(label.to_string()))?;
        let minutes = caps[1]
            .parse::<u32>()
            .map_err(|_| ReadTimeError::OutOfRange(label.to_string()))?;

        Ok(Self {
            minutes,
            label: label.to_string(),
        })
    }

    /// 分钟数
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// 原始文案
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl FromStr for ReadTime {
    type Err = ReadTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReadTime {
    type Error = ReadTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReadTime> for String {
    fn from(value: ReadTime) -> Self {
        value.label
    }
}

impl fmt::Display for ReadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.label)
    }
}

/// 博客文章 - 页面加载期间只读
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// 文章唯一标识符
    pub id: u32,
    /// 文章标题
    pub title: String,
    /// 文章摘要
    pub excerpt: String,
    /// 分类
    pub category: String,
    /// 标签列表，顺序即展示顺序
    pub tags: Vec<String>,
    /// 发布日期 (YYYY-MM-DD)
    pub date: NaiveDate,
    /// 阅读时长
    pub read_time: ReadTime,
    /// 详情页路径标识，目录内唯一
    pub slug: String,
    /// 配图路径
    #[serde(default)]
    pub image: Option<String>,
    /// 作者
    #[serde(default)]
    pub author: Option<String>,
    /// 详情页正文 (HTML)
    #[serde(default)]
    pub content: Option<String>,
}

impl Post {
    /// 配图路径，缺失时回退到占位图
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// 卡片上展示的前几个标签
    pub fn preview_tags(&self) -> &[String] {
        &self.tags[..self.tags.len().min(PREVIEW_TAG_LIMIT)]
    }

    /// 详情页链接
    pub fn url(&self) -> String {
        format!("/blog/{}", self.slug)
    }
}
