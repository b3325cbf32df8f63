use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use utils_common::models::Post;

use crate::error::CatalogError;

/// 表示"不筛选"的选项值
pub const ALL: &str = "All";

/// 分类或标签的选中值
///
/// `None` 表示不限；`Some` 中的值永远不是 "All"，由构造函数保证。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Facet(Option<String>);

impl Facet {
    /// 不限
    pub fn all() -> Self {
        Facet(None)
    }

    /// 精确匹配某个值 (区分大小写)；"All" 归一化为不限
    pub fn only(value: impl Into<String>) -> Self {
        let value = value.into();
        if value == ALL {
            Facet(None)
        } else {
            Facet(Some(value))
        }
    }

    pub fn is_all(&self) -> bool {
        self.0.is_none()
    }

    /// 选中的具体值
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(ALL)
    }

    /// 单值匹配，用于分类
    pub fn matches(&self, value: &str) -> bool {
        match self.value() {
            None => true,
            Some(selected) => selected == value,
        }
    }

    /// 逐元素匹配，用于标签；不做子串匹配
    pub fn matches_any(&self, values: &[String]) -> bool {
        match self.value() {
            None => true,
            Some(selected) => values.iter().any(|v| v == selected),
        }
    }
}

impl From<String> for Facet {
    fn from(value: String) -> Self {
        Facet::only(value)
    }
}

impl From<&str> for Facet {
    fn from(value: &str) -> Self {
        Facet::only(value)
    }
}

impl From<Facet> for String {
    fn from(value: Facet) -> Self {
        value.0.unwrap_or_else(|| ALL.to_string())
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 排序方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// 按日期降序
    #[default]
    Newest,
    /// 按日期升序
    Oldest,
    /// 按阅读时长升序
    Shortest,
    /// 按阅读时长降序
    Longest,
}

impl SortKey {
    pub const VARIANTS: [SortKey; 4] = [SortKey::Newest, SortKey::Oldest, SortKey::Shortest, SortKey::Longest];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Shortest => "shortest",
            SortKey::Longest => "longest",
        }
    }

    /// 下拉框中的显示文案
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "Newest First",
            SortKey::Oldest => "Oldest First",
            SortKey::Shortest => "Shortest Read",
            SortKey::Longest => "Longest Read",
        }
    }

    /// 下拉框的全部选项
    pub fn options() -> Vec<SortOption> {
        SortKey::VARIANTS
            .into_iter()
            .map(|key| SortOption {
                value: key.as_str(),
                label: key.label(),
            })
            .collect()
    }

    /// 比较两篇文章；相等的键返回 Equal，配合稳定排序保留目录顺序
    pub fn compare(self, a: &Post, b: &Post) -> Ordering {
        match self {
            SortKey::Newest => b.date.cmp(&a.date),
            SortKey::Oldest => a.date.cmp(&b.date),
            SortKey::Shortest => a.read_time.minutes().cmp(&b.read_time.minutes()),
            SortKey::Longest => b.read_time.minutes().cmp(&a.read_time.minutes()),
        }
    }
}

impl FromStr for SortKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::VARIANTS
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownSortKey(s.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 排序下拉框的一个选项
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// 查询状态 - 由界面层持有，每次用户操作修改一个字段
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryState {
    /// 搜索文本，不区分大小写的子串匹配
    pub search_text: String,
    /// 选中的分类
    pub selected_category: Facet,
    /// 选中的标签
    pub selected_tag: Facet,
    /// 排序方式
    pub sort_key: SortKey,
}

impl QueryState {
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<Facet>) -> Self {
        self.selected_category = category.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<Facet>) -> Self {
        self.selected_tag = tag.into();
        self
    }

    pub fn with_sort(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// 恢复默认值
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// 是否有任何字段偏离默认值 (决定"清除筛选"按钮和置顶文章的显示)
    pub fn has_active_filters(&self) -> bool {
        *self != Self::default()
    }
}

/// 可选的分类和标签，均以 "All" 开头，其余按首次出现顺序排列
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// 一次查询的结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryOutcome {
    /// 筛选并排序后的文章
    pub posts: Vec<Post>,
    /// 结果数量
    pub total: usize,
    /// 目录中的文章总数
    pub catalog_total: usize,
    /// 查询状态是否偏离默认值
    pub has_active_filters: bool,
}

impl QueryOutcome {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// 结果数量提示
    pub fn summary(&self) -> String {
        if self.total == self.catalog_total {
            format!("Showing all {} articles", self.catalog_total)
        } else {
            format!("Showing {} of {} articles", self.total, self.catalog_total)
        }
    }

    /// 置顶文章：仅在没有任何筛选时展示第一篇
    pub fn featured(&self) -> Option<&Post> {
        if self.has_active_filters {
            None
        } else {
            self.posts.first()
        }
    }

    /// 网格中展示的文章；有置顶文章时跳过它
    pub fn grid(&self) -> &[Post] {
        match self.featured() {
            Some(_) => &self.posts[1..],
            None => &self.posts,
        }
    }
}

/// 卡片数据：文章本身加上渲染所需的派生字段
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
    #[serde(flatten)]
    pub post: Post,
    /// 配图，缺失时为占位图
    pub image_src: String,
    pub preview_tags: Vec<String>,
    pub url: String,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            image_src: post.image_or_placeholder().to_string(),
            preview_tags: post.preview_tags().to_vec(),
            url: post.url(),
            post: post.clone(),
        }
    }
}

/// 返回给前端的结果视图
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    /// 全部结果
    pub posts: Vec<PostCard>,
    /// 置顶文章
    pub featured: Option<PostCard>,
    /// 网格中的文章 (不含置顶文章)
    pub grid: Vec<PostCard>,
    pub total: usize,
    pub catalog_total: usize,
    pub has_active_filters: bool,
    pub summary: String,
}

impl From<QueryOutcome> for ResultsView {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            posts: outcome.posts.iter().map(PostCard::from).collect(),
            featured: outcome.featured().map(PostCard::from),
            grid: outcome.grid().iter().map(PostCard::from).collect(),
            summary: outcome.summary(),
            total: outcome.total,
            catalog_total: outcome.catalog_total,
            has_active_filters: outcome.has_active_filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facet_all_round_trips_through_string() {
        assert_eq!(Facet::from("All"), Facet::all());
        assert_eq!(Facet::from("React").value(), Some("React"));
        assert_eq!(String::from(Facet::all()), "All");

        // 区分大小写: "all" 是普通取值
        assert_eq!(Facet::from("all").value(), Some("all"));
    }

    #[test]
    fn literal_all_is_never_a_value() {
        let facet = Facet::only("All");
        assert!(facet.is_all());
        assert_eq!(facet, Facet::default());
        assert_eq!(facet.value(), None);
        assert!(facet.matches("React"));

        let state = QueryState::default().with_category("All").with_tag(String::from("All"));
        assert!(!state.has_active_filters());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["selectedCategory"], "All");
        let back: QueryState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn tag_facet_is_element_wise() {
        let tags = vec!["Node.js".to_string(), "Performance".to_string()];
        assert!(Facet::from("Node.js").matches_any(&tags));
        assert!(!Facet::from("Node").matches_any(&tags));
        assert!(!Facet::from("node.js").matches_any(&tags));
        assert!(Facet::all().matches_any(&[]));
    }

    #[test]
    fn sort_key_parses_lowercase_names() {
        assert_eq!("shortest".parse::<SortKey>().unwrap(), SortKey::Shortest);
        assert!(matches!(
            "title_asc".parse::<SortKey>(),
            Err(CatalogError::UnknownSortKey(name)) if name == "title_asc"
        ));
        assert_eq!(SortKey::default(), SortKey::Newest);
    }

    #[test]
    fn sort_options_follow_dropdown_order() {
        let options = SortKey::options();
        assert_eq!(options.len(), 4);
        assert_eq!(options[0], SortOption { value: "newest", label: "Newest First" });
        assert_eq!(options[3], SortOption { value: "longest", label: "Longest Read" });

        for option in &options {
            assert!(option.value.parse::<SortKey>().is_ok());
        }
    }

    #[test]
    fn query_state_reads_partial_json() {
        let state: QueryState =
            serde_json::from_str(r#"{"searchText":"mongo","sortKey":"longest"}"#).unwrap();
        assert_eq!(state.search_text, "mongo");
        assert_eq!(state.selected_category, Facet::all());
        assert_eq!(state.selected_tag, Facet::all());
        assert_eq!(state.sort_key, SortKey::Longest);

        assert!(serde_json::from_str::<QueryState>(r#"{"sortKey":"random"}"#).is_err());
    }

    #[test]
    fn active_filters_follow_every_field() {
        let mut state = QueryState::default();
        assert!(!state.has_active_filters());

        assert!(state.clone().with_search("x").has_active_filters());
        assert!(state.clone().with_category("CSS").has_active_filters());
        assert!(state.clone().with_tag("REST").has_active_filters());
        assert!(state.clone().with_sort(SortKey::Oldest).has_active_filters());

        state = state.with_search("docker").with_tag("Docker");
        state.clear();
        assert_eq!(state, QueryState::default());
    }

    #[test]
    fn summary_text_matches_listing_copy() {
        let outcome = QueryOutcome {
            posts: Vec::new(),
            total: 0,
            catalog_total: 8,
            has_active_filters: true,
        };
        assert_eq!(outcome.summary(), "Showing 0 of 8 articles");
        assert!(outcome.featured().is_none());
        assert!(outcome.grid().is_empty());

        let all = QueryOutcome { total: 8, ..outcome };
        assert_eq!(all.summary(), "Showing all 8 articles");
    }
}
