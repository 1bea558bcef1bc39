//! 單元測試用的記憶體內 wiki。

use crate::domain::ports::{QueryParams, WikiApi};
use crate::utils::error::{AuditError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

struct Route {
    action: String,
    expect: Vec<(String, String)>,
    response: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    pub page: String,
    pub content: String,
    pub summary: String,
}

#[derive(Clone, Default)]
pub struct FakeWiki {
    routes: Arc<Vec<Route>>,
    calls: Arc<Mutex<Vec<(String, QueryParams)>>>,
    writes: Arc<Mutex<Vec<WriteCall>>>,
    reject_writes: bool,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    /// 參數全部符合時回應；多條路由同時符合時取條件最多者
    pub fn on(mut self, action: &str, expect: &[(&str, &str)], response: Value) -> Self {
        let routes = Arc::get_mut(&mut self.routes).expect("routes are configured before use");
        routes.push(Route {
            action: action.to_string(),
            expect: expect
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            response,
        });
        self
    }

    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    pub async fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.lock().await.clone()
    }

    pub async fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().await.clone()
    }

    /// 指定參數值出現過幾次
    pub async fn count_calls(&self, key: &str, value: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(_, params)| params.get(key).map(String::as_str) == Some(value))
            .count()
    }
}

#[async_trait]
impl WikiApi for FakeWiki {
    async fn query(&self, action: &str, params: &QueryParams) -> Result<Value> {
        self.calls
            .lock()
            .await
            .push((action.to_string(), params.clone()));

        self.routes
            .iter()
            .filter(|route| route.action == action)
            .filter(|route| {
                route
                    .expect
                    .iter()
                    .all(|(k, v)| params.get(k).map(String::as_str) == Some(v.as_str()))
            })
            .max_by_key(|route| route.expect.len())
            .map(|route| route.response.clone())
            .ok_or_else(|| AuditError::ApiResponse {
                code: "unrouted".to_string(),
                info: format!("no fake response for {} {:?}", action, params),
            })
    }

    async fn write(&self, page_title: &str, content: &str, summary: &str) -> Result<()> {
        if self.reject_writes {
            return Err(AuditError::WriteFailed {
                page: page_title.to_string(),
                reason: "protectedpage".to_string(),
            });
        }
        self.writes.lock().await.push(WriteCall {
            page: page_title.to_string(),
            content: content.to_string(),
            summary: summary.to_string(),
        });
        Ok(())
    }
}

pub fn transclusion_page(titles: &[&str], next: Option<&str>) -> Value {
    let entries: Vec<Value> = titles
        .iter()
        .map(|title| json!({"ns": 1, "title": title}))
        .collect();
    let mut body = json!({
        "query": {"pages": [{"ns": 10, "title": "Template:Frag", "transcludedin": entries}]}
    });
    if let Some(token) = next {
        body["continue"] = json!({"ticontinue": token, "continue": "||"});
    }
    body
}

/// (index, line, toclevel)，fromtitle 以底線形式回傳
pub fn outline(title: &str, sections: &[(&str, &str, u32)]) -> Value {
    let sections: Vec<Value> = sections
        .iter()
        .map(|(index, line, level)| {
            json!({
                "toclevel": level,
                "level": (level + 1).to_string(),
                "line": line,
                "index": index,
                "fromtitle": title.replace(' ', "_"),
            })
        })
        .collect();
    json!({"parse": {"title": title, "pageid": 1, "sections": sections}})
}

pub fn section_content(templates: &[&str], wikitext: &str) -> Value {
    let templates: Vec<Value> = templates
        .iter()
        .map(|title| json!({"ns": 10, "title": title, "exists": true}))
        .collect();
    json!({"parse": {"title": "x", "pageid": 1, "templates": templates, "wikitext": wikitext}})
}
