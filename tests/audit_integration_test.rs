use anyhow::Result;
use countdown_audit::core::Pipeline;
use countdown_audit::{AuditConfig, AuditEngine, AuditError, AuditPipeline, MediaWikiClient};
use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const API_PATH: &str = "/w/api.php";
const REPORT_PAGE: &str = "User:Tiger-bot/watchlist/1";

fn config_for(server: &MockServer, mode: &str) -> Result<AuditConfig> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[site]
api_endpoint = "{}"
timeout_seconds = 5

[credentials]
username = "Tiger-bot@audit"
password = "secret"

[audit]
template = "Template:TalkpageCountdown"
report_page = "{}"
mode = "{}"
summary = "Bot: update countdown report"

[report]
expired_heading = "已過期"
not_expired_heading = "未過期"
"#,
        server.url(API_PATH),
        REPORT_PAGE,
        mode
    )?;

    Ok(AuditConfig::from_file(file.path())?)
}

fn mock_discovery(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path(API_PATH)
            .query_param("action", "query")
            .query_param("prop", "transcludedin")
            .query_param("titles", "Template:TalkpageCountdown")
            .query_param("tishow", "!redirect")
            .query_param("tilimit", "max");
        then.status(200).json_body(json!({
            "batchcomplete": true,
            "query": {"pages": [{
                "ns": 10,
                "title": "Template:TalkpageCountdown",
                "transcludedin": [
                    {"ns": 1, "title": "Talk:Alpha"},
                    {"ns": 10, "title": "Template:TalkpageCountdown"},
                    {"ns": 4, "title": "Wikipedia:Village_pump"}
                ]
            }]}
        }));
    })
}

fn mock_outline<'a>(server: &'a MockServer, page: &str, sections: serde_json::Value) -> httpmock::Mock<'a> {
    let page = page.to_string();
    server.mock(move |when, then| {
        when.method(GET)
            .path(API_PATH)
            .query_param("action", "parse")
            .query_param("page", page.as_str())
            .query_param("prop", "sections");
        then.status(200).json_body(json!({"parse": {"title": page, "sections": sections}}));
    })
}

fn mock_section<'a>(
    server: &'a MockServer,
    page: &str,
    index: &str,
    templates: &[&str],
    wikitext: &str,
) -> httpmock::Mock<'a> {
    let page = page.to_string();
    let index = index.to_string();
    let templates: Vec<serde_json::Value> = templates
        .iter()
        .map(|t| json!({"ns": 10, "title": t, "exists": true}))
        .collect();
    let wikitext = wikitext.to_string();
    server.mock(move |when, then| {
        when.method(GET)
            .path(API_PATH)
            .query_param("action", "parse")
            .query_param("page", page.as_str())
            .query_param("section", index.as_str());
        then.status(200).json_body(json!({
            "parse": {"title": page, "templates": templates, "wikitext": wikitext}
        }));
    })
}

/// 兩個頁面：Alpha 的倒數已過期，Village pump 尚未到期，另有一段落缺少 target-time
fn mock_corpus(server: &MockServer) -> Vec<httpmock::Mock<'_>> {
    vec![
        mock_discovery(server),
        mock_outline(
            server,
            "Talk:Alpha",
            json!([
                {"toclevel": 1, "level": "2", "line": "Merge proposal", "index": "1", "fromtitle": "Talk:Alpha"},
                {"toclevel": 2, "level": "3", "line": "Comments", "index": "2", "fromtitle": "Talk:Alpha"},
                {"toclevel": 1, "level": "2", "line": "Unrelated", "index": "3", "fromtitle": "Talk:Alpha"}
            ]),
        ),
        mock_section(
            server,
            "Talk:Alpha",
            "1",
            &["Template:TalkpageCountdown"],
            "== Merge proposal ==\n{{TalkpageCountdown|target-time=2001-01-01T00:00:00Z}}",
        ),
        mock_section(server, "Talk:Alpha", "3", &["Template:Unsigned"], "== Unrelated ==\n"),
        mock_outline(
            server,
            "Wikipedia:Village pump",
            json!([
                {"toclevel": 1, "level": "2", "line": "RfC", "index": "1", "fromtitle": "Wikipedia:Village_pump"},
                {"toclevel": 1, "level": "2", "line": "Broken", "index": "2", "fromtitle": "Wikipedia:Village_pump"}
            ]),
        ),
        mock_section(
            server,
            "Wikipedia:Village pump",
            "1",
            &["Template:TalkpageCountdown"],
            "== RfC ==\n{{TalkpageCountdown|closer=Bot|target-time=2999-12-31T23:59:59Z}}",
        ),
        mock_section(
            server,
            "Wikipedia:Village pump",
            "2",
            &["Template:TalkpageCountdown"],
            "== Broken ==\n{{TalkpageCountdown|a=1|b=2|target-time=2999-12-31}}",
        ),
    ]
}

fn mock_login(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path(API_PATH)
            .query_param("meta", "tokens")
            .query_param("type", "login");
        then.status(200)
            .json_body(json!({"query": {"tokens": {"logintoken": "login+\\"}}}));
    });
    server.mock(|when, then| {
        when.method(POST).path(API_PATH).x_www_form_urlencoded_tuple("action", "login");
        then.status(200)
            .json_body(json!({"login": {"result": "Success", "lgusername": "Tiger-bot"}}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path(API_PATH)
            .query_param("meta", "tokens")
            .query_param("type", "csrf");
        then.status(200)
            .json_body(json!({"query": {"tokens": {"csrftoken": "csrf+\\"}}}));
    });
}

const EXPECTED_REPORT: &str = "== 已過期 ==\n\
* [[Talk:Alpha#Merge proposal]] - 2001-01-01T00:00:00Z\n\
\n\
== 未過期 ==\n\
* [[Wikipedia:Village pump#RfC]] - 2999-12-31T23:59:59Z\n";

#[tokio::test]
async fn test_end_to_end_audit_writes_classified_report() -> Result<()> {
    let server = MockServer::start();
    let corpus = mock_corpus(&server);
    mock_login(&server);

    let edit_mock = server.mock(|when, then| {
        when.method(POST)
            .path(API_PATH)
            .x_www_form_urlencoded_tuple("action", "edit")
            .x_www_form_urlencoded_tuple("title", REPORT_PAGE)
            .x_www_form_urlencoded_tuple("text", EXPECTED_REPORT)
            .x_www_form_urlencoded_tuple("summary", "Bot: update countdown report")
            .x_www_form_urlencoded_tuple("token", "csrf+\\");
        then.status(200).json_body(json!({
            "edit": {"result": "Success", "title": REPORT_PAGE, "newrevid": 123}
        }));
    });

    let config = config_for(&server, "timestamp")?;
    let client = MediaWikiClient::new(&config.site)?;
    let credentials = config.require_credentials()?.clone();
    client.login(&credentials.username, &credentials.password).await?;

    let engine = AuditEngine::new(AuditPipeline::new(client, config)?);
    let outcome = engine.run().await?;

    assert_eq!(outcome.report_page, REPORT_PAGE);
    assert_eq!(outcome.report.text, EXPECTED_REPORT);
    assert_eq!(outcome.report.expired, 1);
    assert_eq!(outcome.report.not_expired, 1);
    assert_eq!(outcome.report.skipped.len(), 1);
    assert_eq!(outcome.report.skipped[0].document_title, "Wikipedia:Village pump");
    assert_eq!(outcome.report.skipped[0].section_index, "2");

    // 子段落不會被查詢
    for mock in &corpus {
        assert!(mock.hits() <= 1);
    }
    edit_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_simple_mode_lists_sections_without_headings() -> Result<()> {
    let server = MockServer::start();
    mock_corpus(&server);
    // 簡易模式不正規化標題，API 以底線形式查詢
    mock_outline(
        &server,
        "Wikipedia:Village_pump",
        json!([
            {"toclevel": 1, "level": "2", "line": "RfC", "index": "1", "fromtitle": "Wikipedia:Village_pump"},
            {"toclevel": 1, "level": "2", "line": "Broken", "index": "2", "fromtitle": "Wikipedia:Village_pump"}
        ]),
    );
    mock_section(&server, "Wikipedia:Village_pump", "1", &["Template:TalkpageCountdown"], "");
    mock_section(&server, "Wikipedia:Village_pump", "2", &["Template:TalkpageCountdown"], "");

    let config = config_for(&server, "simple")?;
    let client = MediaWikiClient::new(&config.site)?;
    let pipeline = AuditPipeline::new(client, config)?;

    let harvest = pipeline.extract().await?;
    let report = pipeline.transform(harvest).await?;

    // 簡易模式保留原始標題，也不檢查 target-time
    assert_eq!(
        report.text,
        "* [[Talk:Alpha#Merge proposal]]\n\
         * [[Wikipedia:Village_pump#RfC]]\n\
         * [[Wikipedia:Village_pump#Broken]]\n"
    );
    assert!(report.skipped.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_preview_is_repeatable_and_never_edits() -> Result<()> {
    let server = MockServer::start();
    mock_corpus(&server);
    let edit_mock = server.mock(|when, then| {
        when.method(POST).path(API_PATH).x_www_form_urlencoded_tuple("action", "edit");
        then.status(200).json_body(json!({"edit": {"result": "Success"}}));
    });

    let config = config_for(&server, "timestamp")?;
    let engine = AuditEngine::new(AuditPipeline::new(MediaWikiClient::new(&config.site)?, config)?);

    let first = engine.preview().await?;
    let second = engine.preview().await?;

    assert_eq!(first.text, EXPECTED_REPORT);
    assert_eq!(first.text, second.text);
    edit_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_malformed_outline_aborts_without_writing() -> Result<()> {
    let server = MockServer::start();
    mock_discovery(&server);
    mock_login(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path(API_PATH)
            .query_param("action", "parse")
            .query_param("prop", "sections");
        then.status(200).json_body(json!({"parse": {"title": "Talk:Alpha"}}));
    });
    let edit_mock = server.mock(|when, then| {
        when.method(POST).path(API_PATH).x_www_form_urlencoded_tuple("action", "edit");
        then.status(200).json_body(json!({"edit": {"result": "Success"}}));
    });

    let config = config_for(&server, "timestamp")?;
    let engine = AuditEngine::new(AuditPipeline::new(MediaWikiClient::new(&config.site)?, config)?);

    let err = engine.run().await.unwrap_err();

    match err {
        AuditError::MalformedResponse { context, .. } => assert!(context.contains("Talk:Alpha")),
        other => panic!("unexpected error: {:?}", other),
    }
    edit_mock.assert_hits(0);
    Ok(())
}
