use std::path::PathBuf;
use thiserror::Error;
use utils_common::CodecError;

/// 文章目录相关错误
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("无法构建目录: 没有文章数据")]
    Empty,

    #[error("文章ID重复: {0}")]
    DuplicateId(u32),

    #[error("文章slug重复: {0}")]
    DuplicateSlug(String),

    #[error("文章 {id} 缺少slug")]
    EmptySlug { id: u32 },

    #[error("文章 {slug} 缺少分类")]
    EmptyCategory { slug: String },

    #[error("文章 {slug} 含有空标签")]
    EmptyTag { slug: String },

    #[error("未知的排序方式: {0}")]
    UnknownSortKey(String),

    #[error("快照编解码失败: {0}")]
    Snapshot(#[from] CodecError),

    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("无法写入文件 `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}
