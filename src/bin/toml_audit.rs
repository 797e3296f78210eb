use clap::Parser;
use follow_audit::config::toml_config::TomlConfig;
use follow_audit::core::archive::{ArchiveBundle, ArchiveResolver};
use follow_audit::core::ConfigProvider;
use follow_audit::utils::{logger, validation::Validate};
use follow_audit::{AuditEngine, AuditPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-audit")]
#[command(about = "Follow audit driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "follow-audit.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show which inputs would be compared without writing reports
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置；日誌格式取決於配置，所以載入失敗只能直接輸出
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based follow audit");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No reports will be written");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = AuditPipeline::new(LocalStorage::new("."), config);
    let engine = AuditEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Audit completed successfully!");
            println!("✅ Audit completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Audit failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Audit: {}", config.audit_name());
    if let Some(description) = &config.audit.description {
        println!("  Description: {}", description);
    }

    match config.archive_path() {
        Some(archive) => println!("  Input: {} (ZIP export)", archive),
        None => println!(
            "  Input: {} / {}",
            config.following_path().unwrap_or("-"),
            config.followers_path().unwrap_or("-")
        ),
    }

    match config.backend_executable() {
        Some(executable) => println!("  Backend: {}", executable),
        None => println!("  Backend: in-process"),
    }

    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📥 Input Analysis:");
    if let Some(archive) = config.archive_path() {
        let bytes = std::fs::read(archive)
            .map_err(|e| anyhow::anyhow!("cannot read archive '{}': {}", archive, e))?;
        let bundle = ArchiveBundle::from_bytes(bytes)?;
        println!("  Archive: {} ({} entries)", archive, bundle.entry_names().len());

        match ArchiveResolver::resolve_pair(bundle.entry_names()) {
            Ok(pair) => {
                println!("  Tier: {}", pair.tier);
                println!("  Following: {}", pair.following);
                println!("  Followers: {}", pair.followers);
            }
            Err(e) => println!("  ⚠️ {}", e.user_friendly_message()),
        }
    } else {
        for path in [config.following_path(), config.followers_path()].into_iter().flatten() {
            let status = if std::path::Path::new(path).is_file() {
                "found"
            } else {
                "missing"
            };
            println!("  {}: {}", path, status);
        }
    }

    println!();
    println!("🔄 Comparison:");
    match config.backend_executable() {
        Some(executable) => {
            println!("  External backend: {}", executable);
            if let Some(timeout) = config.backend_timeout() {
                println!("  Timeout: {}s", timeout.as_secs());
            }
        }
        None => println!("  In-process set difference"),
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if let Some(filename) = config.compressed_output() {
        println!("  Compression: {} (ZIP)", filename);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
