use crate::core::title::invocation_name;
use crate::utils::error::{AuditError, Result};
use regex::Regex;

/// 從模板呼叫中擷取 `target-time` 參數
///
/// 只容許 `target-time` 前面最多出現一個其他參數：
/// `{{Frag|a=1|target-time=...}}` 可以匹配，`{{Frag|a=1|b=2|target-time=...}}` 不行。
#[derive(Debug, Clone)]
pub struct TargetTimeMatcher {
    pattern: Regex,
}

impl TargetTimeMatcher {
    pub fn new(template_title: &str) -> Result<Self> {
        let name = name_pattern(invocation_name(template_title));
        let source = format!(
            r"\{{\{{\s*(?:[Tt]emplate\s*:\s*)?{}\s*(\|[^|}}]*)?\|target-time=([0-9TZ:+\-]{{8,25}})[^}}]*\}}\}}",
            name
        );

        let pattern = Regex::new(&source).map_err(|e| AuditError::ConfigValidationError {
            field: "audit.template".to_string(),
            message: format!("cannot build target-time pattern: {}", e),
        })?;

        Ok(Self { pattern })
    }

    /// 只取第一個匹配；值本身不在這裡驗證
    pub fn extract<'t>(&self, wikitext: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(wikitext)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str())
    }
}

// 模板名稱首字母不分大小寫，空白與底線互通
fn name_pattern(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let head = if first.to_lowercase().eq(first.to_uppercase()) {
        regex::escape(&first.to_string())
    } else {
        format!(
            "[{}{}]",
            regex::escape(&first.to_uppercase().to_string()),
            regex::escape(&first.to_lowercase().to_string())
        )
    };

    let tail = chars
        .as_str()
        .split(|c: char| c == ' ' || c == '_')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("[ _]+");

    format!("{}{}", head, tail)
}
