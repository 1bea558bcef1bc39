use clap::Parser;
use countdown_audit::core::ConfigProvider;
use countdown_audit::utils::error::{AuditError, ErrorSeverity};
use countdown_audit::utils::{logger, validation::Validate};
use countdown_audit::{AuditConfig, AuditEngine, AuditPipeline, CliArgs, MediaWikiClient};
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting countdown-audit");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match AuditConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(mode) = args.mode {
        config.audit.mode = mode;
        tracing::info!("🔧 Mode overridden to: {}", mode);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    tracing::info!(
        "✅ Auditing [[{}]] in {} mode, report page [[{}]]",
        config.template_title(),
        config.mode(),
        config.report_page()
    );

    let span = tracing::info_span!(
        "audit",
        template = %config.template_title(),
        mode = %config.mode()
    );
    if let Err(e) = run(&args, config).instrument(span).await {
        fail(&e);
    }

    Ok(())
}

async fn run(args: &CliArgs, config: AuditConfig) -> countdown_audit::Result<()> {
    let client = MediaWikiClient::new(&config.site)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the report page will not be edited");
        if let Some(credentials) = &config.credentials {
            client.login(&credentials.username, &credentials.password).await?;
        }
    } else {
        let credentials = config.require_credentials()?;
        client.login(&credentials.username, &credentials.password).await?;
    }

    let pipeline = AuditPipeline::new(client, config)?;
    let engine = AuditEngine::new(pipeline);

    if args.dry_run {
        let report = engine.preview().await?;
        print!("{}", report.text);
        return Ok(());
    }

    let outcome = engine.run().await?;
    println!("✅ Report saved to [[{}]]", outcome.report_page);
    if !outcome.report.skipped.is_empty() {
        println!(
            "⚠️ {} section(s) skipped, see the log for details",
            outcome.report.skipped.len()
        );
    }
    Ok(())
}

fn fail(e: &AuditError) -> ! {
    tracing::error!(
        "❌ Audit failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
