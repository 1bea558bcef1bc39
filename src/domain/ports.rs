use crate::domain::model::{AuditMode, Harvest, Report};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// API 查詢參數（不含 action）
pub type QueryParams = BTreeMap<String, String>;

/// 對 wiki 的查詢與寫入能力
#[async_trait]
pub trait WikiApi: Send + Sync {
    async fn query(&self, action: &str, params: &QueryParams) -> Result<serde_json::Value>;
    async fn write(&self, page_title: &str, content: &str, summary: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn template_title(&self) -> &str;
    fn report_page(&self) -> &str;
    fn edit_summary(&self) -> &str;
    fn mode(&self) -> AuditMode;
    fn expired_heading(&self) -> &str;
    fn not_expired_heading(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Harvest>;
    async fn transform(&self, harvest: Harvest) -> Result<Report>;
    async fn load(&self, report: &Report) -> Result<String>;
}

