use crate::core::responses::{continuation_params, decode, TransclusionResponse};
use crate::core::title::{normalize_title, same_title};
use crate::domain::model::DocumentList;
use crate::domain::ports::{QueryParams, WikiApi};
use crate::utils::error::{AuditError, Result};

/// 列出所有嵌入模板的頁面（不含模板頁本身，也不含經由重新導向的嵌入）
///
/// 依 `continue` 物件逐頁查詢直到沒有續查標記為止。任何一頁格式不符都會
/// 直接回傳錯誤，不產生部分結果。`normalize` 為真時標題轉為標準空白形式。
pub async fn discover_transclusions<A>(
    api: &A,
    template_title: &str,
    normalize: bool,
) -> Result<DocumentList>
where
    A: WikiApi + ?Sized,
{
    let mut base = QueryParams::new();
    base.insert("prop".to_string(), "transcludedin".to_string());
    base.insert("titles".to_string(), template_title.to_string());
    base.insert("tiprop".to_string(), "title".to_string());
    base.insert("tishow".to_string(), "!redirect".to_string());
    base.insert("tilimit".to_string(), "max".to_string());

    let mut documents = DocumentList::new();
    let mut params = base.clone();
    let mut page = 1usize;

    loop {
        let value = api.query("query", &params).await?;
        let response: TransclusionResponse =
            decode(value, &format!("transcludedin page {} of [[{}]]", page, template_title))?;

        let first = response.query.pages.into_iter().next().ok_or_else(|| {
            AuditError::malformed(
                format!("transcludedin page {} of [[{}]]", page, template_title),
                "query.pages is empty",
            )
        })?;

        let mut added = 0usize;
        for entry in first.transcludedin {
            if same_title(&entry.title, template_title) {
                continue;
            }
            let title = if normalize {
                normalize_title(&entry.title)
            } else {
                entry.title
            };
            if documents.push(title) {
                added += 1;
            }
        }
        tracing::debug!("🔎 Discovery page {}: {} new titles", page, added);

        match response.continuation {
            Some(continuation) => {
                params = base.clone();
                params.extend(continuation_params(continuation));
                page += 1;
            }
            None => break,
        }
    }

    tracing::info!(
        "🔎 Found {} pages transcluding [[{}]] ({} request(s))",
        documents.len(),
        template_title,
        page
    );
    Ok(documents)
}
