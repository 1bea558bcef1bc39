use crate::config::toml_config::SiteConfig;
use crate::core::responses::decode;
use crate::domain::ports::{QueryParams, WikiApi};
use crate::utils::error::{AuditError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    query: TokenQuery,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    tokens: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    login: LoginResult,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    result: String,
    #[serde(default)]
    reason: serde_json::Value,
    lgusername: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditResponse {
    edit: EditResult,
}

#[derive(Debug, Deserialize)]
struct EditResult {
    result: String,
    #[serde(default)]
    nochange: bool,
    newrevid: Option<u64>,
}

/// MediaWiki Action API 用戶端，登入後的 session 保存在 cookie 中
pub struct MediaWikiClient {
    client: Client,
    endpoint: String,
}

impl MediaWikiClient {
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(site.user_agent())
            .timeout(Duration::from_secs(site.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            endpoint: site.api_endpoint.clone(),
        })
    }

    /// 以 bot password 登入
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let token = self.fetch_token("login").await?;

        let mut params = QueryParams::new();
        params.insert("action".to_string(), "login".to_string());
        params.insert("lgname".to_string(), username.to_string());
        params.insert("lgpassword".to_string(), password.to_string());
        params.insert("lgtoken".to_string(), token);

        let value = self.post(params).await?;
        let response: LoginResponse = decode(value, "login")?;

        if response.login.result != "Success" {
            let reason = match response.login.reason {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => response.login.result.clone(),
                other => other.to_string(),
            };
            return Err(AuditError::LoginFailed { reason });
        }

        tracing::info!(
            "🔑 Logged in as {}",
            response.login.lgusername.as_deref().unwrap_or(username)
        );
        Ok(())
    }

    async fn fetch_token(&self, kind: &str) -> Result<String> {
        let mut params = QueryParams::new();
        params.insert("action".to_string(), "query".to_string());
        params.insert("meta".to_string(), "tokens".to_string());
        params.insert("type".to_string(), kind.to_string());

        let value = self.get(params).await?;
        let response: TokenResponse = decode(value, &format!("{} token", kind))?;

        let key = format!("{}token", kind);
        response
            .query
            .tokens
            .get(&key)
            .cloned()
            .ok_or_else(|| AuditError::malformed(format!("{} token", kind), format!("missing field `{}`", key)))
    }

    async fn get(&self, params: QueryParams) -> Result<serde_json::Value> {
        let params = with_common_params(params);
        tracing::debug!("📡 GET {} {:?}", self.endpoint, params);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        check_api_error(response.json().await?)
    }

    async fn post(&self, params: QueryParams) -> Result<serde_json::Value> {
        let params = with_common_params(params);
        tracing::debug!(
            "📡 POST {} action={}",
            self.endpoint,
            params.get("action").map(String::as_str).unwrap_or_default()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await?
            .error_for_status()?;

        check_api_error(response.json().await?)
    }
}

#[async_trait]
impl WikiApi for MediaWikiClient {
    async fn query(&self, action: &str, params: &QueryParams) -> Result<serde_json::Value> {
        let mut params = params.clone();
        params.insert("action".to_string(), action.to_string());
        self.get(params).await
    }

    async fn write(&self, page_title: &str, content: &str, summary: &str) -> Result<()> {
        let write_failed = |reason: String| AuditError::WriteFailed {
            page: page_title.to_string(),
            reason,
        };

        let token = self.fetch_token("csrf").await?;

        let mut params = QueryParams::new();
        params.insert("action".to_string(), "edit".to_string());
        params.insert("title".to_string(), page_title.to_string());
        params.insert("text".to_string(), content.to_string());
        params.insert("summary".to_string(), summary.to_string());
        params.insert("bot".to_string(), "1".to_string());
        params.insert("assert".to_string(), "user".to_string());
        params.insert("token".to_string(), token);

        let value = match self.post(params).await {
            Ok(value) => value,
            Err(AuditError::ApiResponse { code, info }) => {
                return Err(write_failed(format!("{}: {}", code, info)));
            }
            Err(e) => return Err(e),
        };

        let response: EditResponse = decode(value, &format!("edit of [[{}]]", page_title))?;
        if response.edit.result != "Success" {
            return Err(write_failed(format!("edit result was '{}'", response.edit.result)));
        }

        if response.edit.nochange {
            tracing::info!("✏️ [[{}]] already up to date", page_title);
        } else if let Some(revid) = response.edit.newrevid {
            tracing::info!("✏️ [[{}]] saved as revision {}", page_title, revid);
        }
        Ok(())
    }
}

fn with_common_params(mut params: QueryParams) -> QueryParams {
    params.insert("format".to_string(), "json".to_string());
    params.insert("formatversion".to_string(), "2".to_string());
    params.insert("utf8".to_string(), "1".to_string());
    params
}

fn check_api_error(value: serde_json::Value) -> Result<serde_json::Value> {
    if let Some(error) = value.get("error") {
        let field = |key: &str| {
            error
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string()
        };
        return Err(AuditError::ApiResponse {
            code: field("code"),
            info: field("info"),
        });
    }

    if let Some(warnings) = value.get("warnings") {
        tracing::debug!("API warnings: {}", warnings);
    }

    Ok(value)
}
