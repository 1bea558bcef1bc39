use crate::core::{Pipeline, Report};
use crate::utils::error::Result;

/// 一次完整執行的結果
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub report_page: String,
    pub report: Report,
}

pub struct AuditEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AuditEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 探索、分類並寫入報告頁；任何致命錯誤都不會寫入部分報告
    pub async fn run(&self) -> Result<AuditOutcome> {
        let report = self.preview().await?;

        tracing::info!("💾 Writing report...");
        let report_page = self.pipeline.load(&report).await?;
        tracing::info!("💾 Report saved to [[{}]]", report_page);

        Ok(AuditOutcome {
            report_page,
            report,
        })
    }

    /// 只產生報告內容，不寫入
    pub async fn preview(&self) -> Result<Report> {
        tracing::info!("🔎 Discovering transclusions...");
        let harvest = self.pipeline.extract().await?;
        tracing::info!(
            "🔎 Checked {} page(s), {} section(s) use the template",
            harvest.documents,
            harvest.references.len() + harvest.skipped.len()
        );

        tracing::info!("🗂️ Classifying sections...");
        let report = self.pipeline.transform(harvest).await?;
        if report.expired + report.not_expired > 0 {
            tracing::info!(
                "🗂️ {} expired, {} not yet expired",
                report.expired,
                report.not_expired
            );
        } else {
            tracing::info!("🗂️ {} section(s) listed", report.listed);
        }

        for skipped in &report.skipped {
            tracing::warn!(
                "⚠️ Skipped section {} of [[{}]]: {}",
                skipped.section_index,
                skipped.document_title,
                skipped.reason
            );
        }

        Ok(report)
    }
}
