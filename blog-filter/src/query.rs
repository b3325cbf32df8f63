use std::collections::{HashMap, HashSet};
use utils_common::models::Post;
use utils_common::compression;

use crate::builder::{CatalogBuilder, SNAPSHOT_MAX_MAJOR, SNAPSHOT_VERSION};
use crate::error::CatalogError;
use crate::models::{Facets, QueryOutcome, QueryState, ALL};

/// 按查询状态筛选并排序文章
///
/// 三个条件同时满足才保留：
/// 1. 搜索文本非空时，标题、摘要或任一标签包含该文本 (不区分大小写)
/// 2. 分类不是 "All" 时，分类完全相等
/// 3. 标签不是 "All" 时，标签列表中有完全相等的元素
///
/// 排序是稳定的，键相同的文章保持目录中的相对顺序。
pub fn query(catalog: &[Post], state: &QueryState) -> Vec<Post> {
    let needle = state.search_text.to_lowercase();

    let mut matched: Vec<Post> = catalog
        .iter()
        .filter(|post| needle.is_empty() || matches_search(post, &needle))
        .filter(|post| state.selected_category.matches(&post.category))
        .filter(|post| state.selected_tag.matches_any(&post.tags))
        .cloned()
        .collect();

    matched.sort_by(|a, b| state.sort_key.compare(a, b));
    matched
}

// needle 已转为小写
fn matches_search(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post.excerpt.to_lowercase().contains(needle)
        || post.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

/// 从目录中提取可选的分类和标签
pub fn derive_facets(catalog: &[Post]) -> Facets {
    Facets {
        categories: first_seen(catalog.iter().map(|post| post.category.as_str())),
        tags: first_seen(catalog.iter().flat_map(|post| post.tags.iter().map(String::as_str))),
    }
}

fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = vec![ALL.to_string()];
    for value in values {
        if seen.insert(value) {
            ordered.push(value.to_string());
        }
    }
    ordered
}

/// 文章目录 - 页面加载后只读，附带预先计算的分类/标签和slug索引
#[derive(Debug, Clone)]
pub struct Catalog {
    posts: Vec<Post>,
    facets: Facets,
    slug_index: HashMap<String, usize>,
}

impl Catalog {
    /// 校验并构建目录
    pub fn new(posts: Vec<Post>) -> Result<Self, CatalogError> {
        let mut builder = CatalogBuilder::new();
        builder.extend(posts);
        builder.build()
    }

    // 调用方负责保证 slug_index 与 posts 一致
    pub(crate) fn from_parts(posts: Vec<Post>, slug_index: HashMap<String, usize>) -> Self {
        let facets = derive_facets(&posts);
        Self {
            posts,
            facets,
            slug_index,
        }
    }

    /// 从JSON数组加载
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let posts: Vec<Post> = serde_json::from_str(json)?;
        Self::new(posts)
    }

    /// 从压缩快照加载
    pub fn from_snapshot(data: &[u8]) -> Result<Self, CatalogError> {
        let posts: Vec<Post> = compression::from_compressed_with_max_version(data, SNAPSHOT_MAX_MAJOR)?;
        log::debug!("快照解析完成，文章数量: {}", posts.len());
        Self::new(posts)
    }

    /// 导出压缩快照
    pub fn to_snapshot(&self) -> Result<Vec<u8>, CatalogError> {
        Ok(compression::to_compressed(&self.posts, SNAPSHOT_VERSION)?)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    /// 执行查询
    pub fn run(&self, state: &QueryState) -> QueryOutcome {
        let posts = query(&self.posts, state);
        QueryOutcome {
            total: posts.len(),
            catalog_total: self.posts.len(),
            has_active_filters: state.has_active_filters(),
            posts,
        }
    }

    /// 按slug查找目录中的任意文章
    pub fn find_by_slug(&self, slug: &str) -> Option<&Post> {
        self.slug_index.get(slug).and_then(|&i| self.posts.get(i))
    }

    /// 详情页查找：只有带正文的文章才有详情页，其余返回 None ("Post Not Found")
    pub fn find_article(&self, slug: &str) -> Option<&Post> {
        self.find_by_slug(slug).filter(|post| post.content.is_some())
    }
}
