use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use utils_common::models::Post;

use crate::error::CatalogError;
use crate::query::Catalog;

/// 快照格式版本
pub const SNAPSHOT_VERSION: [u8; 2] = [1, 0];

/// 加载时接受的最大主版本
pub const SNAPSHOT_MAX_MAJOR: u8 = 1;

/// 文章目录构建器
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    posts: Vec<Post>,
}

impl CatalogBuilder {
    /// 创建新的目录构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加文章，顺序即目录顺序
    pub fn add_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    pub fn extend(&mut self, posts: impl IntoIterator<Item = Post>) {
        self.posts.extend(posts);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// 校验数据并构建目录
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let slug_index = validate(&self.posts)?;
        log::debug!("目录校验通过，文章数量: {}", self.posts.len());

        Ok(Catalog::from_parts(self.posts, slug_index))
    }

    /// 构建目录并保存压缩快照
    pub fn save_snapshot(self, path: &Path) -> Result<Catalog, CatalogError> {
        let catalog = self.build()?;
        let data = catalog.to_snapshot()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CatalogError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(path, &data).map_err(|e| CatalogError::Io(path.to_path_buf(), e))?;

        log::info!(
            "目录快照已写入: {}，文章: {}，大小: {} 字节",
            path.display(),
            catalog.len(),
            data.len()
        );
        Ok(catalog)
    }
}

// 数据完整性问题在发布前拦截，返回 slug -> 下标 索引
fn validate(posts: &[Post]) -> Result<HashMap<String, usize>, CatalogError> {
    if posts.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut ids = HashSet::with_capacity(posts.len());
    let mut slug_index = HashMap::with_capacity(posts.len());

    for (i, post) in posts.iter().enumerate() {
        if !ids.insert(post.id) {
            return Err(CatalogError::DuplicateId(post.id));
        }
        if post.slug.is_empty() {
            return Err(CatalogError::EmptySlug { id: post.id });
        }
        if post.category.is_empty() {
            return Err(CatalogError::EmptyCategory { slug: post.slug.clone() });
        }
        if post.tags.iter().any(String::is_empty) {
            return Err(CatalogError::EmptyTag { slug: post.slug.clone() });
        }
        if slug_index.insert(post.slug.clone(), i).is_some() {
            return Err(CatalogError::DuplicateSlug(post.slug.clone()));
        }
    }

    Ok(slug_index)
}
