use crate::domain::model::{
    AuditMode, Expiry, FragmentReference, Harvest, Report, ReportBucket, SkippedSection,
};
use crate::utils::error::AuditError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 帶時區偏移的格式；`%z` 同時接受 `+0800` 與 `+08:00`
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// 解析 target-time，接受 RFC 3339、帶偏移或 `Z` 的分鐘精度，以及不帶時區的日期／時間（視為 UTC）
pub fn parse_target_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // 結尾的 Z 即 UTC，去掉後與無時區格式相同
    let naive_value = value.strip_suffix('Z').unwrap_or(value);
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 嚴格早於 `now` 才算過期，相等視為未過期
pub fn classify(target: DateTime<Utc>, now: DateTime<Utc>) -> Expiry {
    if target < now {
        Expiry::Expired
    } else {
        Expiry::NotExpired
    }
}

pub struct ReportBuilder<'a> {
    mode: AuditMode,
    expired_heading: &'a str,
    not_expired_heading: &'a str,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(mode: AuditMode, expired_heading: &'a str, not_expired_heading: &'a str) -> Self {
        Self {
            mode,
            expired_heading,
            not_expired_heading,
        }
    }

    /// `now` 在整份報告中只取一次
    pub fn build(&self, harvest: Harvest, now: DateTime<Utc>) -> Report {
        match self.mode {
            AuditMode::Simple => Self::build_flat(harvest),
            AuditMode::Timestamp => self.build_classified(harvest, now),
        }
    }

    fn build_flat(harvest: Harvest) -> Report {
        let text: String = harvest
            .references
            .iter()
            .map(|r| format!("* {}\n", r.wikilink()))
            .collect();

        Report {
            text,
            expired: 0,
            not_expired: 0,
            listed: harvest.references.len(),
            skipped: harvest.skipped,
        }
    }

    fn build_classified(&self, harvest: Harvest, now: DateTime<Utc>) -> Report {
        let mut expired = ReportBucket::new(Expiry::Expired);
        let mut not_expired = ReportBucket::new(Expiry::NotExpired);
        let mut skipped = harvest.skipped;

        for reference in &harvest.references {
            match self.classify_reference(reference, now) {
                Ok((expiry, line)) => match expiry {
                    Expiry::Expired => expired.push(line),
                    Expiry::NotExpired => not_expired.push(line),
                },
                Err(err) => {
                    tracing::warn!("⚠️ {}", err);
                    skipped.push(SkippedSection {
                        document_title: reference.document_title.clone(),
                        section_index: reference.section_index.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let text = format!(
            "{}\n{}",
            self.render_bucket(&expired),
            self.render_bucket(&not_expired)
        );

        Report {
            text,
            expired: expired.lines.len(),
            not_expired: not_expired.lines.len(),
            listed: expired.lines.len() + not_expired.lines.len(),
            skipped,
        }
    }

    fn render_bucket(&self, bucket: &ReportBucket) -> String {
        let heading = match bucket.expiry {
            Expiry::Expired => self.expired_heading,
            Expiry::NotExpired => self.not_expired_heading,
        };
        format!("== {} ==\n{}", heading, bucket.lines.concat())
    }

    fn classify_reference(
        &self,
        reference: &FragmentReference,
        now: DateTime<Utc>,
    ) -> Result<(Expiry, String), AuditError> {
        let invalid = |value: &str| AuditError::InvalidTimestamp {
            document: reference.document_title.clone(),
            section: reference.section_index.clone(),
            value: value.to_string(),
        };

        let raw = reference.target_time.as_deref().unwrap_or_default();
        let target = parse_target_time(raw).ok_or_else(|| invalid(raw))?;
        let line = format!("* {} - {}\n", reference.wikilink(), raw);

        Ok((classify(target, now), line))
    }
}
