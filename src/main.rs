use clap::Parser;
use lit_entity_etl::core::client::API_KEY_ENV;
use lit_entity_etl::utils::error::ErrorSeverity;
use lit_entity_etl::utils::validation::{require_env_var, Validate};
use lit_entity_etl::utils::logger;
use lit_entity_etl::{CliConfig, EtlEngine, EtlError, ExtractionPipeline, LocalStorage, OpenAiService};

fn exit_code(e: &EtlError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e).max(1));
}

#[tokio::main]
async fn main() {
    // .env 不存在時直接忽略
    let _ = dotenvy::dotenv();

    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting lit-entity-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let api_key = match require_env_var(API_KEY_ENV) {
        Ok(key) => key,
        Err(e) => fail(&e),
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    let monitor_enabled = config.monitor;

    let storage = LocalStorage::new(config.output_path.clone());
    let service = OpenAiService::new(config.api_base.clone(), api_key);
    let pipeline = ExtractionPipeline::new(storage, config, service);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Extraction completed");
            println!("✅ Extraction completed. Frequency tables saved to: {}", output_path);
        }
        Err(e) => fail(&e),
    }
}
