use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 執行模式：`Simple` 只列出段落，`Timestamp` 額外擷取 target-time 並分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    Simple,
    #[default]
    Timestamp,
}

impl AuditMode {
    pub fn extracts_timestamps(self) -> bool {
        matches!(self, AuditMode::Timestamp)
    }
}

impl fmt::Display for AuditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditMode::Simple => write!(f, "simple"),
            AuditMode::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// 某頁面某個頂層段落中的一次模板使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentReference {
    pub document_title: String,
    /// 僅在本次查詢有效，頁面編輯後可能改變
    pub section_index: String,
    pub section_heading: String,
    pub target_time: Option<String>,
}

impl FragmentReference {
    /// `[[標題#段落]]` 形式的站內連結
    pub fn wikilink(&self) -> String {
        format!("[[{}#{}]]", self.document_title, self.section_heading)
    }
}

/// SectionTable 的一列：頂層段落的索引與標題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub index: String,
    pub heading: String,
}

/// 去重後的頁面標題清單，保留 API 回傳順序
#[derive(Debug, Clone, Default)]
pub struct DocumentList {
    titles: Vec<String>,
    seen: HashSet<String>,
}

impl DocumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存在時回傳 false
    pub fn push(&mut self, title: String) -> bool {
        if self.seen.contains(&title) {
            return false;
        }
        self.seen.insert(title.clone());
        self.titles.push(title);
        true
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.titles
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Expired,
    NotExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBucket {
    pub expiry: Expiry,
    pub lines: Vec<String>,
}

impl ReportBucket {
    pub fn new(expiry: Expiry) -> Self {
        Self {
            expiry,
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

/// 確認含有模板、但未列入報告的段落
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSection {
    pub document_title: String,
    pub section_index: String,
    pub reason: String,
}

/// 解析階段的產出
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub documents: usize,
    pub references: Vec<FragmentReference>,
    pub skipped: Vec<SkippedSection>,
}

/// 最終寫入報告頁的內容與統計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub expired: usize,
    pub not_expired: usize,
    /// 報告中列出的段落數；時間戳模式下等於 expired + not_expired
    pub listed: usize,
    pub skipped: Vec<SkippedSection>,
}
