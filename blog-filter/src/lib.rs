use wasm_bindgen::prelude::*;
use serde::Serialize;
use std::fmt::Display;
use web_sys::console;

// 导出模块
pub mod builder;
pub mod error;
pub mod models;
pub mod query;
pub mod session;

pub use builder::CatalogBuilder;
pub use error::CatalogError;
pub use models::{Facet, Facets, PostCard, QueryOutcome, QueryState, ResultsView, SortKey, SortOption};
pub use query::{derive_facets, query, Catalog};
pub use session::{query_once_view, FilterSession};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// 记录到浏览器控制台并转换为JS错误
fn js_error(context: &str, err: impl Display) -> JsValue {
    let message = format!("{}: {}", context, err);
    console::error_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

// None 序列化为 null 而不是 undefined
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error("序列化结果失败", e))
}

fn to_js_array(values: &[String]) -> js_sys::Array {
    values.iter().map(|v| JsValue::from_str(v)).collect()
}

/// 博客筛选器JS接口 - 每个页面持有一个实例
#[wasm_bindgen]
pub struct BlogFilterJS {
    session: FilterSession,
}

#[wasm_bindgen]
impl BlogFilterJS {
    /// 从压缩快照初始化
    pub fn from_snapshot(index_data: &[u8]) -> Result<BlogFilterJS, JsValue> {
        let catalog = Catalog::from_snapshot(index_data)
            .map_err(|e| js_error("初始化过滤器失败", e))?;
        Ok(Self {
            session: FilterSession::new(catalog),
        })
    }

    /// 从JSON数组初始化
    pub fn from_json(catalog_json: &str) -> Result<BlogFilterJS, JsValue> {
        let catalog = Catalog::from_json(catalog_json)
            .map_err(|e| js_error("初始化过滤器失败", e))?;
        Ok(Self {
            session: FilterSession::new(catalog),
        })
    }

    /// 所有分类 (以 "All" 开头)
    pub fn categories(&self) -> js_sys::Array {
        to_js_array(&self.session.facets().categories)
    }

    /// 所有标签 (以 "All" 开头)
    pub fn tags(&self) -> js_sys::Array {
        to_js_array(&self.session.facets().tags)
    }

    pub fn set_search(&mut self, text: &str) {
        self.session.set_search(text);
    }

    pub fn set_category(&mut self, category: &str) {
        self.session.set_category(category);
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.session.set_tag(tag);
    }

    pub fn set_sort(&mut self, sort_key: &str) -> Result<(), JsValue> {
        self.session
            .set_sort_name(sort_key)
            .map_err(|e| js_error("设置排序失败", e))
    }

    /// 排序下拉框选项 [{value, label}]
    pub fn sort_options(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.sort_options())
    }

    pub fn clear_filters(&mut self) {
        self.session.clear_filters();
    }

    pub fn has_active_filters(&self) -> bool {
        self.session.has_active_filters()
    }

    /// 当前查询状态
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.state())
    }

    /// 当前筛选结果
    pub fn results(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.view())
    }

    /// 按slug查找文章卡片，找不到返回 null
    pub fn find_by_slug(&self, slug: &str) -> Result<JsValue, JsValue> {
        match self.session.find_by_slug(slug) {
            Some(post) => to_js(&PostCard::from(post)),
            None => Ok(JsValue::NULL),
        }
    }

    /// 详情页文章，没有正文时返回 null
    pub fn find_article(&self, slug: &str) -> Result<JsValue, JsValue> {
        match self.session.find_article(slug) {
            Some(post) => to_js(&PostCard::from(post)),
            None => Ok(JsValue::NULL),
        }
    }

    /// 导出压缩快照
    pub fn to_snapshot(&self) -> Result<Vec<u8>, JsValue> {
        self.session
            .catalog()
            .to_snapshot()
            .map_err(|e| js_error("导出快照失败", e))
    }
}

/// 无状态查询接口
#[wasm_bindgen]
pub fn query_once(catalog_json: &str, state_json: &str) -> Result<JsValue, JsValue> {
    let view = query_once_view(catalog_json, state_json).map_err(|e| js_error("筛选文章失败", e))?;
    to_js(&view)
}
