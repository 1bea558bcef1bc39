//! Wiki API 回應中流程所依賴的最小欄位。
//!
//! 缺少任何欄位都視為格式錯誤，由 [`decode`] 轉成 `MalformedResponse`。

use crate::utils::error::{AuditError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct TransclusionResponse {
    pub query: TransclusionQuery,
    #[serde(rename = "continue")]
    pub continuation: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct TransclusionQuery {
    pub pages: Vec<TransclusionPage>,
}

#[derive(Debug, Deserialize)]
pub struct TransclusionPage {
    /// 沒有結果時 API 會省略此欄位
    #[serde(default)]
    pub transcludedin: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TitleEntry {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseResponse<T> {
    pub parse: T,
}

#[derive(Debug, Deserialize)]
pub struct OutlineBody {
    pub sections: Vec<OutlineSection>,
}

#[derive(Debug, Deserialize)]
pub struct OutlineSection {
    pub index: String,
    pub line: String,
    pub toclevel: u32,
    /// 由解析器函數產生的段落會是 `false`
    #[serde(default)]
    pub fromtitle: serde_json::Value,
}

impl OutlineSection {
    pub fn origin_title(&self) -> Option<&str> {
        self.fromtitle.as_str()
    }
}

#[derive(Debug, Deserialize)]
pub struct SectionContentBody {
    pub templates: Vec<TitleEntry>,
    pub wikitext: Option<String>,
}

pub fn decode<T: DeserializeOwned>(value: serde_json::Value, context: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AuditError::malformed(context, e))
}

/// continue 物件的值一律轉成字串參數
pub fn continuation_params(
    continuation: BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, String> {
    continuation
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}
