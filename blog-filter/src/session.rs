use utils_common::models::Post;

use crate::error::CatalogError;
use crate::models::{Facet, Facets, QueryOutcome, QueryState, ResultsView, SortKey, SortOption};
use crate::query::Catalog;

/// 一次页面浏览的筛选会话：只读目录 + 唯一的查询状态
///
/// 每个 setter 只修改一个字段，结果在调用 [`FilterSession::results`] 时同步重新计算。
#[derive(Debug, Clone)]
pub struct FilterSession {
    catalog: Catalog,
    state: QueryState,
}

impl FilterSession {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: QueryState::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn facets(&self) -> &Facets {
        self.catalog.facets()
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.state.search_text = text.into();
    }

    pub fn set_category(&mut self, category: impl Into<Facet>) {
        self.state.selected_category = category.into();
    }

    /// 选择标签 (下拉框或点击卡片上的标签)
    pub fn set_tag(&mut self, tag: impl Into<Facet>) {
        self.state.selected_tag = tag.into();
    }

    pub fn set_sort(&mut self, sort_key: SortKey) {
        self.state.sort_key = sort_key;
    }

    /// 按名称设置排序方式，未知名称不修改状态
    pub fn set_sort_name(&mut self, name: &str) -> Result<(), CatalogError> {
        self.state.sort_key = name.parse()?;
        Ok(())
    }

    /// 排序下拉框选项
    pub fn sort_options(&self) -> Vec<SortOption> {
        SortKey::options()
    }

    pub fn clear_filters(&mut self) {
        self.state.clear();
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.has_active_filters()
    }

    pub fn results(&self) -> QueryOutcome {
        self.catalog.run(&self.state)
    }

    pub fn view(&self) -> ResultsView {
        self.results().into()
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Post> {
        self.catalog.find_by_slug(slug)
    }

    pub fn find_article(&self, slug: &str) -> Option<&Post> {
        self.catalog.find_article(slug)
    }
}

/// 无状态的一次性查询：JSON目录 + JSON查询状态
pub fn query_once_view(catalog_json: &str, state_json: &str) -> Result<ResultsView, CatalogError> {
    let catalog = Catalog::from_json(catalog_json)?;
    let state: QueryState = if state_json.trim().is_empty() {
        QueryState::default()
    } else {
        serde_json::from_str(state_json)?
    };
    Ok(catalog.run(&state).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {"id": 1, "title": "Scalable React", "excerpt": "TypeScript at scale", "category": "React",
         "tags": ["React", "TypeScript", "Architecture", "Best Practices"], "date": "2024-01-15",
         "readTime": "8 min read", "slug": "react", "image": "/images/blog-react-typescript.jpg"},
        {"id": 2, "title": "Docker for JavaScript Developers", "excerpt": "Containers", "category": "DevOps",
         "tags": ["Docker", "Node.js"], "date": "2023-12-05", "readTime": "13 min read", "slug": "docker"}
    ]"#;

    fn session() -> FilterSession {
        FilterSession::new(Catalog::from_json(CATALOG).unwrap())
    }

    #[test]
    fn setters_change_one_field_at_a_time() {
        let mut session = session();
        session.set_search("docker");
        session.set_tag("Node.js");

        assert_eq!(session.state().search_text, "docker");
        assert_eq!(session.state().selected_tag, Facet::only("Node.js"));
        assert_eq!(session.state().selected_category, Facet::all());
        assert!(session.has_active_filters());
        assert_eq!(session.results().total, 1);

        session.clear_filters();
        assert_eq!(session.state(), &QueryState::default());
        assert_eq!(session.results().total, 2);
    }

    #[test]
    fn unknown_sort_name_keeps_previous_key() {
        let mut session = session();
        session.set_sort_name("shortest").unwrap();
        assert!(session.set_sort_name("popular").is_err());
        assert_eq!(session.state().sort_key, SortKey::Shortest);
    }

    #[test]
    fn view_carries_summary_and_featured_post() {
        let mut session = session();
        let view = session.view();
        assert_eq!(view.summary, "Showing all 2 articles");
        assert_eq!(view.featured.as_ref().map(|card| card.post.id), Some(1));
        assert_eq!(view.grid.len(), 1);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["featured"]["slug"], "react");
        assert_eq!(json["featured"]["imageSrc"], "/images/blog-react-typescript.jpg");
        assert_eq!(json["featured"]["url"], "/blog/react");
        assert_eq!(
            json["featured"]["previewTags"],
            serde_json::json!(["React", "TypeScript", "Architecture"])
        );
        assert_eq!(json["grid"][0]["slug"], "docker");
        assert_eq!(json["grid"][0]["imageSrc"], "/placeholder.svg");

        session.set_category("DevOps");
        let view = session.view();
        assert_eq!(view.summary, "Showing 1 of 2 articles");
        assert!(view.featured.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["catalogTotal"], 2);
        assert_eq!(json["hasActiveFilters"], true);
        assert_eq!(json["featured"], serde_json::Value::Null);
        assert_eq!(json["posts"][0]["slug"], "docker");
        assert_eq!(json["grid"][0]["slug"], "docker");
    }

    #[test]
    fn sort_options_serialize_as_value_label_pairs() {
        let json = serde_json::to_value(session().sort_options()).unwrap();
        assert_eq!(json[1], serde_json::json!({"value": "oldest", "label": "Oldest First"}));
    }

    #[test]
    fn query_once_accepts_blank_state() {
        let view = query_once_view(CATALOG, "").unwrap();
        assert_eq!(view.total, 2);

        let view = query_once_view(CATALOG, r#"{"sortKey": "longest"}"#).unwrap();
        assert_eq!(view.posts[0].post.id, 2);

        assert!(query_once_view(CATALOG, r#"{"sortKey": "title_asc"}"#).is_err());
    }
}
