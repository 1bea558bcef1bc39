use crate::core::discovery::discover_transclusions;
use crate::core::matcher::TargetTimeMatcher;
use crate::core::report::ReportBuilder;
use crate::core::sections::SectionResolver;
use crate::core::{ConfigProvider, Harvest, Pipeline, Report, WikiApi};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

pub struct AuditPipeline<A: WikiApi, C: ConfigProvider> {
    api: A,
    config: C,
    matcher: Option<TargetTimeMatcher>,
}

impl<A: WikiApi, C: ConfigProvider> AuditPipeline<A, C> {
    pub fn new(api: A, config: C) -> Result<Self> {
        let matcher = if config.mode().extracts_timestamps() {
            Some(TargetTimeMatcher::new(config.template_title())?)
        } else {
            None
        };

        Ok(Self {
            api,
            config,
            matcher,
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// 以指定時間分類，`transform` 以目前時間呼叫
    pub fn transform_at(&self, harvest: Harvest, now: DateTime<Utc>) -> Report {
        ReportBuilder::new(
            self.config.mode(),
            self.config.expired_heading(),
            self.config.not_expired_heading(),
        )
        .build(harvest, now)
    }
}

#[async_trait::async_trait]
impl<A: WikiApi, C: ConfigProvider> Pipeline for AuditPipeline<A, C> {
    async fn extract(&self) -> Result<Harvest> {
        let template = self.config.template_title();
        let normalize = self.config.mode().extracts_timestamps();

        let documents = discover_transclusions(&self.api, template, normalize).await?;
        let resolver = SectionResolver::new(&self.api, template, self.matcher.as_ref());

        let mut harvest = Harvest {
            documents: documents.len(),
            ..Harvest::default()
        };

        for (position, title) in documents.iter().enumerate() {
            tracing::debug!("📄 [{}/{}] Resolving [[{}]]", position + 1, documents.len(), title);

            let resolution = resolver.resolve(title).await?;
            if !resolution.references.is_empty() {
                tracing::info!(
                    "📄 [[{}]]: {} section(s) use the template",
                    title,
                    resolution.references.len()
                );
            }
            harvest.references.extend(resolution.references);
            harvest.skipped.extend(resolution.skipped);
        }

        Ok(harvest)
    }

    async fn transform(&self, harvest: Harvest) -> Result<Report> {
        Ok(self.transform_at(harvest, Utc::now()))
    }

    async fn load(&self, report: &Report) -> Result<String> {
        let page = self.config.report_page();
        tracing::debug!("Writing {} bytes to [[{}]]", report.text.len(), page);

        self.api
            .write(page, &report.text, self.config.edit_summary())
            .await?;

        tracing::debug!("Report page saved successfully");
        Ok(page.to_string())
    }
}
