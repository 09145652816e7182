//! `fetch-orchestrator` command line entry point

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use fetch_orchestrator::logging::init_tracing;
use fetch_orchestrator::pipeline::{resolve_inline_pipeline, INLINE_PIPELINE_ENV};
use fetch_orchestrator::{FetchOrchestrator, MigrationError, OrchestratorConfig, RunOutcome};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("fetch-orchestrator")
        .version(fetch_orchestrator::VERSION)
        .about("Migrate index metadata, then transfer and monitor documents if needed")
        .arg(
            Arg::new("base_path")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Install root containing pipelines/ and bin/data-prepper"),
        )
        .arg(
            Arg::new("config_file")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Pipeline configuration read by the metadata engine"),
        )
        .arg(
            Arg::new("target_host")
                .required(true)
                .help("Target cluster endpoint"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Orchestrator settings file (YAML)"),
        )
        .arg(
            Arg::new("inline-pipeline")
                .long("inline-pipeline")
                .help("Base64 pipeline written to config_file before running [env: INLINE_PIPELINE]"),
        )
        .arg(
            Arg::new("metadata-command")
                .long("metadata-command")
                .value_parser(value_parser!(PathBuf))
                .help("Metadata engine executable"),
        )
        .arg(
            Arg::new("poll-interval-ms")
                .long("poll-interval-ms")
                .value_parser(value_parser!(u64))
                .help("Monitor poll interval in milliseconds"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter used when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
}

fn load_config(args: &ArgMatches) -> Result<OrchestratorConfig, MigrationError> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => OrchestratorConfig::from_yaml_file(path)?,
        None => OrchestratorConfig::new(),
    };

    if let Some(command) = args.get_one::<PathBuf>("metadata-command") {
        config = config.with_metadata_command(command);
    }
    if let Some(millis) = args.get_one::<u64>("poll-interval-ms") {
        config = config.with_poll_interval_ms(*millis);
    }
    if let Some(level) = args.get_one::<String>("log-level") {
        config = config.with_log_level(level);
    }
    if args.get_flag("log-json") {
        config = config.with_log_json(true);
    }
    config.validate()?;
    Ok(config)
}

fn inline_pipeline(args: &ArgMatches, env: Option<String>) -> Option<String> {
    resolve_inline_pipeline(
        args.get_one::<String>("inline-pipeline").map(String::as_str),
        env,
    )
}

async fn run(args: &ArgMatches) -> anyhow::Result<RunOutcome> {
    let config = load_config(args)?;
    init_tracing(&config.log_level, config.log_json);

    let base_path = args
        .get_one::<PathBuf>("base_path")
        .context("missing base_path")?;
    let config_file = args
        .get_one::<PathBuf>("config_file")
        .context("missing config_file")?;
    let target_host = args
        .get_one::<String>("target_host")
        .context("missing target_host")?;

    let inline = inline_pipeline(args, std::env::var(INLINE_PIPELINE_ENV).ok());

    let orchestrator =
        FetchOrchestrator::from_config(&config, base_path).map_err(MigrationError::from)?;
    Ok(orchestrator
        .run_with_inline_pipeline(base_path, config_file, target_host, inline.as_deref())
        .await?)
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let code = match run(&matches).await {
        Ok(RunOutcome::Skipped { metadata }) => {
            tracing::info!(indices = metadata.index_names.len(), "Nothing to transfer");
            0
        }
        Ok(RunOutcome::Completed { metadata, report }) => {
            tracing::info!(
                target_doc_count = metadata.target_doc_count,
                completion = ?report.completion,
                "Transfer finished"
            );
            0
        }
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("fetch-orchestrator: {err:#}");
            MigrationError::EXIT_CODE
        }
    };

    std::process::exit(code);
}
