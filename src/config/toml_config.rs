use crate::core::ConfigProvider;
use crate::domain::model::AuditMode;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_page_title, validate_positive_number, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

const DEFAULT_USER_AGENT: &str = concat!("countdown-audit/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_SUMMARY: &str = "Update countdown template report";
const DEFAULT_EXPIRED_HEADING: &str = "Expired";
const DEFAULT_NOT_EXPIRED_HEADING: &str = "Not yet expired";

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub site: SiteConfig,
    pub credentials: Option<Credentials>,
    pub audit: AuditSection,
    pub report: Option<ReportSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub api_endpoint: String,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// 避免密碼出現在 verbose 日誌
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSection {
    pub template: String,
    pub report_page: String,
    #[serde(default)]
    pub mode: AuditMode,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub expired_heading: Option<String>,
    pub not_expired_heading: Option<String>,
}

impl SiteConfig {
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl AuditConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AuditError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AuditError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WIKI_BOT_PASSWORD})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 實際寫入前必須有帳號
    pub fn require_credentials(&self) -> Result<&Credentials> {
        crate::utils::validation::validate_required_field("credentials", &self.credentials)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("site.api_endpoint", &self.site.api_endpoint)?;
        validate_positive_number("site.timeout_seconds", self.site.timeout_seconds(), 1)?;
        validate_non_empty_string("site.user_agent", self.site.user_agent())?;

        validate_page_title("audit.template", &self.audit.template)?;
        validate_page_title("audit.report_page", &self.audit.report_page)?;

        if let Some(credentials) = &self.credentials {
            validate_non_empty_string("credentials.username", &credentials.username)?;
            validate_non_empty_string("credentials.password", &credentials.password)?;
            if ENV_VAR_RE.is_match(&credentials.password) {
                return Err(AuditError::ConfigValidationError {
                    field: "credentials.password".to_string(),
                    message: "environment variable referenced by the password is not set"
                        .to_string(),
                });
            }
        }

        validate_non_empty_string("report.expired_heading", self.expired_heading())?;
        validate_non_empty_string("report.not_expired_heading", self.not_expired_heading())?;

        Ok(())
    }
}

impl ConfigProvider for AuditConfig {
    fn template_title(&self) -> &str {
        &self.audit.template
    }

    fn report_page(&self) -> &str {
        &self.audit.report_page
    }

    fn edit_summary(&self) -> &str {
        self.audit.summary.as_deref().unwrap_or(DEFAULT_SUMMARY)
    }

    fn mode(&self) -> AuditMode {
        self.audit.mode
    }

    fn expired_heading(&self) -> &str {
        self.report
            .as_ref()
            .and_then(|r| r.expired_heading.as_deref())
            .unwrap_or(DEFAULT_EXPIRED_HEADING)
    }

    fn not_expired_heading(&self) -> &str {
        self.report
            .as_ref()
            .and_then(|r| r.not_expired_heading.as_deref())
            .unwrap_or(DEFAULT_NOT_EXPIRED_HEADING)
    }
}

impl Validate for AuditConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
