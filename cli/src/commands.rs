//! Command handlers
//!
//! Each handler reads its input files, builds the adapters it needs from
//! the loaded configuration and prints the result in the selected format.

use anyhow::{Context, Result};
use quota_gate_application::ports::key_value_store::keys;
use quota_gate_application::{
    InMemoryStore, KeyValueStore, LastPublishedSurvey, ProtocolEventLogger, PublishInput,
    PublishSurveyUseCase, QualificationProgress, QualificationProtocol, QuotaEditor,
    take_last_published,
};
use quota_gate_domain::quota::validate as validate_quota;
use quota_gate_domain::{Category, Dimension, QuotaModel, QuotaType};
use quota_gate_infrastructure::{
    ApiClient, ConfigLoader, FileConfig, FileKeyValueStore, HttpQuotaOracle, HttpSurveyApi,
    HttpVendorNotifier, JsonlProtocolLogger, QuotaDocument,
};
use quota_gate_presentation::{
    ConsoleFormatter, OutputConfig, ProgressReporter, RespondentRunner, VendorCriteriaFile,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// ==================== Input files ====================

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_quota(path: &Path) -> Result<QuotaModel> {
    let document: QuotaDocument = serde_json::from_str(&read_file(path)?)
        .with_context(|| format!("{} is not a quota document", path.display()))?;
    let (model, _) = document
        .into_parts()
        .with_context(|| format!("Invalid quota document {}", path.display()))?;
    Ok(model)
}

fn read_categories(path: Option<&Path>) -> Result<Vec<Category>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&read_file(path)?)
        .with_context(|| format!("{} is not a category catalog", path.display()))
}

fn read_vendor(path: &Path) -> Result<VendorCriteriaFile> {
    VendorCriteriaFile::from_json(&read_file(path)?)
        .with_context(|| format!("{} is not a vendor criteria file", path.display()))
}

// ==================== Wiring ====================

fn api_client(config: &FileConfig) -> Result<ApiClient> {
    let timeout = Duration::from_secs(config.api.timeout_seconds);
    ApiClient::new(&config.api.base_url, timeout).context("Failed to create API client")
}

fn open_store(config: &FileConfig) -> Arc<dyn KeyValueStore> {
    match config.store.resolved_path() {
        Some(path) => Arc::new(FileKeyValueStore::new(path)),
        None => {
            warn!("No data directory available, published records will not persist");
            Arc::new(InMemoryStore::new())
        }
    }
}

/// Exit status after an interrupt, as shells report SIGINT
const INTERRUPTED: u8 = 130;

/// Time given to detached vendor beacons before an interrupted session exits
const BEACON_GRACE: Duration = Duration::from_millis(500);

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// ==================== Quota commands ====================

pub fn validate(quota: &Path, output: &OutputConfig) -> Result<ExitCode> {
    let model = read_quota(quota)?;
    let issues = validate_quota(&model);

    if output.is_json() {
        println!(
            "{}",
            ConsoleFormatter::format_json(&json!({
                "valid": issues.is_empty(),
                "issues": issues,
            }))
        );
    } else {
        print!("{}", ConsoleFormatter::format_quota(&model));
        print!("{}", ConsoleFormatter::format_issues(&issues));
    }
    Ok(exit_code(issues.is_empty()))
}

pub fn screening(
    quota: &Path,
    categories: Option<&Path>,
    output: &OutputConfig,
) -> Result<ExitCode> {
    let editor = QuotaEditor::new(read_quota(quota)?, read_categories(categories)?);
    let questions = &editor.model().screening_questions;

    if output.is_json() {
        println!("{}", ConsoleFormatter::format_json(questions));
    } else {
        print!("{}", ConsoleFormatter::format_screening(questions));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn convert(
    quota: &Path,
    dimension: Dimension,
    to: QuotaType,
    target: Option<&Path>,
    output: &OutputConfig,
) -> Result<ExitCode> {
    let mut editor = QuotaEditor::new(read_quota(quota)?, Vec::new());
    if !editor.convert(dimension, to) {
        info!("{} already uses {} targets", dimension.display_name(), to);
    }

    let document = QuotaDocument::from_model(editor.model(), None);
    match target {
        Some(path) => {
            let json = serde_json::to_string_pretty(&document)?;
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            if !output.is_json() {
                println!("Wrote {}", path.display());
            }
        }
        None if output.is_json() => println!("{}", ConsoleFormatter::format_json(&document)),
        None => print!("{}", ConsoleFormatter::format_quota(editor.model())),
    }
    Ok(ExitCode::SUCCESS)
}

// ==================== Vendor ====================

pub fn vendor_check(criteria: &Path, output: &OutputConfig) -> Result<ExitCode> {
    let file = read_vendor(criteria)?;
    let blocking = file.blocking_error();
    let report = file.report();

    if output.is_json() {
        println!(
            "{}",
            ConsoleFormatter::format_json(&json!({
                "blocking_error": blocking,
                "questions": report,
            }))
        );
    } else {
        print!(
            "{}",
            ConsoleFormatter::format_vendor_report(&report, blocking.as_deref())
        );
    }
    Ok(exit_code(blocking.is_none()))
}

// ==================== Respondent ====================

pub async fn take(
    config: &FileConfig,
    output: &OutputConfig,
    share_token: String,
    auto_restart: bool,
    event_log: Option<PathBuf>,
) -> Result<ExitCode> {
    let client = api_client(config)?;
    let api = Arc::new(HttpSurveyApi::new(client.clone()));
    let oracle = Arc::new(HttpQuotaOracle::new(client.clone()));
    let notifier = Arc::new(HttpVendorNotifier::new(client));

    let mut params = config.protocol_params();
    if auto_restart {
        params = params.with_force_auto_restart(true);
    }

    let progress: Arc<dyn QualificationProgress> = if output.show_progress {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(ProgressReporter::hidden())
    };

    let mut protocol = QualificationProtocol::new(api, oracle, notifier, share_token.clone())
        .with_params(params)
        .with_progress(progress);

    let log_path = event_log.or_else(|| config.logging.event_log.as_ref().map(PathBuf::from));
    if let Some(path) = log_path {
        match JsonlProtocolLogger::new(&path) {
            Some(logger) => {
                let logger: Arc<dyn ProtocolEventLogger> =
                    Arc::new(logger.with_session(share_token));
                protocol = protocol.with_logger(logger);
            }
            None => warn!("Event log {} could not be opened", path.display()),
        }
    }

    let stop = CancellationToken::new();
    spawn_interrupt_watcher(stop.clone());

    let mut runner = RespondentRunner::new(protocol).with_stop(stop.clone());
    let phase = runner.run().await?;
    info!("Respondent session ended in {}", phase);

    if output.is_json() {
        println!(
            "{}",
            ConsoleFormatter::format_json(&json!({
                "phase": phase.display_name(),
                "verdict": runner.protocol().verdict(),
                "response_id": runner.protocol().response_id(),
            }))
        );
    }

    if stop.is_cancelled() {
        tokio::time::sleep(BEACON_GRACE).await;
        return Ok(ExitCode::from(INTERRUPTED));
    }
    Ok(ExitCode::SUCCESS)
}

/// First Ctrl-C stops the session at its next prompt or restart wait.
/// A second one exits at once.
fn spawn_interrupt_watcher(stop: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("Interrupt received, stopping respondent session");
        stop.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            std::process::exit(i32::from(INTERRUPTED));
        }
    });
}

// ==================== Publishing ====================

pub async fn publish(
    config: &FileConfig,
    output: &OutputConfig,
    survey_id: String,
    quota: &Path,
    categories: Option<&Path>,
    vendor: Option<&Path>,
) -> Result<ExitCode> {
    let mut input =
        PublishInput::new(survey_id, read_quota(quota)?).with_categories(read_categories(categories)?);
    if let Some(path) = vendor {
        input = input.with_vendor(read_vendor(path)?.into_selection());
    }

    let client = api_client(config)?;
    let use_case = PublishSurveyUseCase::new(
        Arc::new(HttpSurveyApi::new(client.clone())),
        Arc::new(HttpVendorNotifier::new(client)),
        open_store(config),
    )
    .with_params(config.publish_params());

    let published = use_case.execute(input).await?;

    if output.is_json() {
        println!(
            "{}",
            ConsoleFormatter::format_json(&json!({
                "record": published.record,
                "local_link": published.local_link,
                "vendor_notified": published.vendor_notified,
            }))
        );
    } else {
        print!("{}", ConsoleFormatter::format_published(&published));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn last_published(config: &FileConfig, output: &OutputConfig, peek: bool) -> Result<ExitCode> {
    let store = open_store(config);
    let record: Option<LastPublishedSurvey> = if peek {
        store
            .get(keys::LAST_PUBLISHED_SURVEY)?
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .context("Stored publish record is corrupt")?
    } else {
        take_last_published(store.as_ref())?
    };

    if output.is_json() {
        println!("{}", ConsoleFormatter::format_json(&record));
    } else {
        print!("{}", ConsoleFormatter::format_last_published(record.as_ref()));
    }
    Ok(ExitCode::SUCCESS)
}

// ==================== Configuration ====================

pub fn show_config(config: &FileConfig) -> Result<ExitCode> {
    ConfigLoader::print_config_sources();
    println!();
    println!("{}", toml::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}
