use anyhow::Context;
use clap::Parser;
use file_sorter::config::cli::Command;
use file_sorter::core::classifier::KeywordSubjectClassifier;
use file_sorter::domain::ports::{Sorter, Storage};
use file_sorter::utils::error::ErrorSeverity;
use file_sorter::utils::{logger, validation::Validate};
use file_sorter::{
    CliConfig, LocalStorage, RemoteSorter, SortEngine, SortOptions, SorterConfig, SorterError,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = match &cli.config {
        Some(path) => SorterConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => SorterConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }
    tracing::debug!("Effective config: {:?}", config);

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ file-sorter failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &SorterConfig) -> Result<(), SorterError> {
    config.validate()?;

    match &cli.command {
        Command::Classify { names, json } => {
            let classifier = load_classifier(config)?;
            let results: Vec<_> = names
                .iter()
                .map(|name| (name.as_str(), classifier.classify(name)))
                .collect();

            if *json {
                let rows: Vec<_> = results
                    .iter()
                    .map(|(file, m)| serde_json::json!({ "file": file, "subject": m }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (file, subject) in results {
                    println!("{} -> {}", file, subject);
                }
            }
        }
        Command::Index { json } => {
            let classifier = load_classifier(config)?;
            let index = classifier.index();

            if *json {
                let subjects: Vec<_> = index
                    .subjects()
                    .iter()
                    .map(|s| serde_json::json!({ "code": s.code, "name": s.name, "keywords": s.keywords }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&subjects)?);
            } else {
                for subject in index.subjects() {
                    let keywords: Vec<&str> = subject.keywords.iter().map(String::as_str).collect();
                    println!("{} {}: {}", subject.code, subject.name, keywords.join(", "));
                }
            }
        }
        Command::Sort {
            input_dir, dry_run, ..
        } => {
            let sorter: Arc<dyn Sorter> = match (&config.remote, cli.use_remote()) {
                (Some(remote), true) => {
                    tracing::info!("🌐 Using remote sorter at {}", remote.endpoint);
                    Arc::new(RemoteSorter::new(remote.endpoint.clone(), config.remote_timeout())?)
                }
                _ => Arc::new(load_classifier(config)?),
            };
            let storage = LocalStorage::new(".".to_string());

            if *dry_run {
                tracing::info!("🔍 DRY RUN MODE - no files will be moved or written");
                let files = storage.list_files(input_dir, config.recursive()).await?;
                for file in files {
                    println!("{} -> {}", file, sorter.sort_file(&file).await);
                }
                return Ok(());
            }

            let options = SortOptions {
                input_dir: input_dir.clone(),
                output_path: config.sort.output_path.clone(),
                mode: config.sort.mode,
                layout: config.sort.layout,
                report_formats: config.report_formats(),
                recursive: config.recursive(),
            };
            let outcome = SortEngine::new(storage, sorter, options).run().await?;

            println!(
                "✅ Sorted {} files ({} unsorted)",
                outcome.report.total_files,
                outcome.report.unsorted_count()
            );
            println!("📁 Report saved to: {}", outcome.report_path);
        }
    }

    Ok(())
}

fn load_classifier(config: &SorterConfig) -> Result<KeywordSubjectClassifier, SorterError> {
    tracing::info!("📁 Loading syllabus from: {}", config.syllabus.path);
    let classifier =
        KeywordSubjectClassifier::from_file(&config.syllabus.path, &config.syllabus_options())?
            .with_tie_policy(config.classifier.tie_policy);
    Ok(classifier)
}
