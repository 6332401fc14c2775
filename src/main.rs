// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_curator::{
    CommandLineInput, CuratorConfig, DocumentStore, NotionHttpClient, OpenAiGenerator,
    PageProcessor, Scheduler, TextGenerator,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion_curator.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] {M} - {m}{n}"
    } else {
        "{d(%H:%M:%S)} [{l}] {m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {M} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Wires the store, the generator and the processor into a scheduler.
fn build_scheduler(config: &CuratorConfig) -> anyhow::Result<Scheduler> {
    let store: Arc<dyn DocumentStore> = Arc::new(
        NotionHttpClient::new(
            &config.notion_key,
            config.database_id.clone(),
            config.settings.names.clone(),
        )
        .context("Could not build the Notion client")?,
    );

    let generator: Arc<dyn TextGenerator> = Arc::new(
        OpenAiGenerator::new(
            config.generation_key.clone(),
            &config.api_base,
            config.model.clone(),
            config.personal_description.clone(),
        )
        .context("Could not build the generation client")?,
    );

    let processor = PageProcessor::new(
        Arc::clone(&store),
        generator,
        config.settings.clone(),
        config.store_retry,
        config.generation_retry,
    );

    Ok(Scheduler::new(
        store,
        processor,
        &config.settings.names,
        config.settings.page_size,
        config.store_retry,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("Could not set up logging: {}", e))?;

    let config = CuratorConfig::resolve(cli).context("Invalid configuration")?;
    log::info!(
        "Curating database {} with model {} ({})",
        config.database_id,
        config.model,
        config.settings.language
    );

    let mut scheduler = build_scheduler(&config)?;

    if config.once {
        let report = scheduler.run_pass().await;
        if let Some(reason) = report.skipped {
            anyhow::bail!("Pass skipped: {}", reason);
        }
    } else {
        scheduler.run(config.interval).await;
    }

    Ok(())
}
