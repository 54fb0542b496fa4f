use anyhow::Context;
use bulk_fhir_log_summary::utils::{logger, validation::Validate};
use bulk_fhir_log_summary::{
    CliConfig, LocalLogSource, SummaryEngine, SummaryError, SummaryPipeline, TomlConfig,
};
use clap::Parser;
use regex::Regex;

fn report_and_exit(e: &SummaryError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

async fn run_cli(config: CliConfig) -> anyhow::Result<()> {
    let file_config = match &config.config {
        Some(path) => {
            let loaded = match TomlConfig::from_file(path) {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::error!("Failed to load config file '{}'", path.display());
                    report_and_exit(&e);
                }
            };
            if let Err(e) = loaded.validate() {
                report_and_exit(&e);
            }
            tracing::info!("✅ Loaded defaults from {}", path.display());
            Some(loaded)
        }
        None => None,
    };

    let options = config.resolve(file_config.as_ref());
    tracing::debug!("Resolved options: {:?}", options);

    if let Err(e) = options.validate() {
        report_and_exit(&e);
    }

    let pattern = Regex::new(&options.file_pattern).context("Invalid file pattern")?;
    let source = LocalLogSource::new(options.log_path.clone(), pattern);
    let pipeline = SummaryPipeline::new(source, options);
    let engine = SummaryEngine::new_with_monitoring(pipeline, config.monitor);

    if let Err(e) = engine.run().await {
        report_and_exit(&e);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose, config.monitor);
    }

    tracing::info!("Starting bulk-fhir-log-summary");
    if config.monitor {
        tracing::info!("🔍 Process monitoring enabled");
    }

    run_cli(config).await
}
