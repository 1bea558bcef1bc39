use crate::core::matcher::TargetTimeMatcher;
use crate::core::responses::{decode, OutlineBody, ParseResponse, SectionContentBody};
use crate::core::title::same_title;
use crate::domain::model::{FragmentReference, SectionEntry, SkippedSection};
use crate::domain::ports::{QueryParams, WikiApi};
use crate::utils::error::{AuditError, Result};

/// 單一頁面的解析結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionResolution {
    pub references: Vec<FragmentReference>,
    pub skipped: Vec<SkippedSection>,
}

/// 找出頁面中直接嵌入模板的頂層段落
///
/// 只檢查 `toclevel == 1` 的段落，子段落與導言中的模板不會被發現。
/// 提供 matcher 時同時擷取 target-time，擷取失敗的段落記為跳過。
pub struct SectionResolver<'a, A: WikiApi + ?Sized> {
    api: &'a A,
    template_title: &'a str,
    matcher: Option<&'a TargetTimeMatcher>,
}

impl<'a, A: WikiApi + ?Sized> SectionResolver<'a, A> {
    pub fn new(api: &'a A, template_title: &'a str, matcher: Option<&'a TargetTimeMatcher>) -> Self {
        Self {
            api,
            template_title,
            matcher,
        }
    }

    pub async fn resolve(&self, page_title: &str) -> Result<SectionResolution> {
        let table = self.fetch_top_level_sections(page_title).await?;
        tracing::debug!(
            "📑 [[{}]]: {} top-level section(s) to check",
            page_title,
            table.len()
        );

        let mut resolution = SectionResolution::default();

        for section in &table {
            let content = self.fetch_section(page_title, &section.index).await?;

            let embeds_template = content
                .templates
                .iter()
                .any(|t| same_title(&t.title, self.template_title));
            if !embeds_template {
                continue;
            }

            let target_time = match self.matcher {
                None => None,
                Some(matcher) => {
                    let wikitext = content.wikitext.as_deref().ok_or_else(|| {
                        AuditError::malformed(
                            format!("section {} of [[{}]]", section.index, page_title),
                            "missing field `wikitext`",
                        )
                    })?;

                    match matcher.extract(wikitext) {
                        Some(value) => Some(value.to_string()),
                        None => {
                            let err = AuditError::ExtractionFailed {
                                document: page_title.to_string(),
                                section: section.index.clone(),
                            };
                            tracing::warn!("⚠️ {}", err);
                            resolution.skipped.push(SkippedSection {
                                document_title: page_title.to_string(),
                                section_index: section.index.clone(),
                                reason: err.to_string(),
                            });
                            continue;
                        }
                    }
                }
            };

            resolution.references.push(FragmentReference {
                document_title: page_title.to_string(),
                section_index: section.index.clone(),
                section_heading: section.heading.clone(),
                target_time,
            });
        }

        Ok(resolution)
    }

    /// 取得頁面目錄，只留下屬於本頁的頂層段落
    async fn fetch_top_level_sections(&self, page_title: &str) -> Result<Vec<SectionEntry>> {
        let mut params = QueryParams::new();
        params.insert("page".to_string(), page_title.to_string());
        params.insert("prop".to_string(), "sections".to_string());

        let value = self.api.query("parse", &params).await?;
        let response: ParseResponse<OutlineBody> =
            decode(value, &format!("section outline of [[{}]]", page_title))?;

        Ok(response
            .parse
            .sections
            .into_iter()
            .filter(|s| s.toclevel == 1)
            .filter(|s| {
                s.origin_title()
                    .map(|origin| same_title(origin, page_title))
                    .unwrap_or(false)
            })
            .map(|s| SectionEntry {
                index: s.index,
                heading: s.line,
            })
            .collect())
    }

    async fn fetch_section(&self, page_title: &str, index: &str) -> Result<SectionContentBody> {
        let prop = if self.matcher.is_some() {
            "templates|wikitext"
        } else {
            "templates"
        };

        let mut params = QueryParams::new();
        params.insert("page".to_string(), page_title.to_string());
        params.insert("section".to_string(), index.to_string());
        params.insert("prop".to_string(), prop.to_string());

        let value = self.api.query("parse", &params).await?;
        let response: ParseResponse<SectionContentBody> =
            decode(value, &format!("section {} of [[{}]]", index, page_title))?;
        Ok(response.parse)
    }
}
