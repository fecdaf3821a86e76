use bipt_inclusion::adapters::http::build_client;
use bipt_inclusion::core::extractor::RecordExtractor;
use bipt_inclusion::utils::error::ErrorSeverity;
use bipt_inclusion::utils::{logger, validation::Validate};
use bipt_inclusion::{
    AppConfig, BiptDirectory, CliArgs, Command, HttpTextProvider, InclusionError,
    InclusionPipeline, JsonStateStore, LocalArtifactStore, PipelineRunner,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let config = match AppConfig::from_cli(&args).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Resolved config: {:?}", config);

    let client = build_client()?;
    let directory = BiptDirectory::new(client.clone(), &config.source_url, &config.lang)?;
    let texts = HttpTextProvider::new(client);
    let state = JsonStateStore::in_dir(&config.data_dir);
    let artifacts = LocalArtifactStore::new(&config.data_dir);
    let extractor = RecordExtractor::new(config.extractor.clone());
    let (hour, minute) = (config.check_hour, config.check_minute);

    let pipeline =
        InclusionPipeline::new(directory, texts, state, artifacts, config).with_extractor(extractor);
    let runner = PipelineRunner::new(pipeline);

    match args.command() {
        Command::Run => match runner.run_once().await {
            Ok(true) => println!("✅ New inclusion list generated"),
            Ok(false) => println!("No change"),
            Err(e) => exit_with(e),
        },
        Command::List => {
            for name in runner.list_artifacts().await? {
                println!("{}", name);
            }
        }
        Command::Schedule => {
            tracing::info!("⏰ Daily check scheduled at {:02}:{:02}", hour, minute);
            runner.run_daily(hour, minute).await?;
        }
    }

    Ok(())
}

fn exit_with(e: InclusionError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
