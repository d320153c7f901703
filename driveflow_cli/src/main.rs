use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use driveflow_client_core::auth::{DRIVE_SCOPE, SHEETS_SCOPE};
use driveflow_client_core::{
    ClientConfig, Credentials, DelimitedRows, FileLocator, LineRows, RowBatch, ServiceAccountKey,
    Transform, ValueInput, Workflow,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod error;
mod orchestrators;
mod output;
mod terminal;

use crate::config::{AppConfig, get_config};
use crate::error::{CliError, CliResult};
use crate::orchestrators::storage_orchestrator::StorageOrchestrator;
use crate::orchestrators::tabular_orchestrator::TabularOrchestrator;
use crate::orchestrators::transfer_orchestrator::TransferOrchestrator;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "driveflow")]
#[command(author, version, about = "Google Drive and Sheets workflow runner", long_about = None)]
struct Cli {
    /// Path to the service account credentials JSON file
    #[arg(long, global = true, env = "GOOGLE_APPLICATION_CREDENTIALS", value_name = "PATH")]
    credentials: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read rows from a spreadsheet range or sheet
    ReadTabular {
        /// Spreadsheet identifier
        #[arg(long, env = "SPREADSHEET_ID")]
        spreadsheet_id: Option<String>,

        /// Range in A1 notation (e.g. 'Sheet1!A1:C10')
        #[arg(long, env = "RANGE_NAME")]
        range: Option<String>,

        /// Sheet name (whole sheet; used when no range is given)
        #[arg(long, env = "SHEET_NAME")]
        sheet: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Write rows to a spreadsheet range
    WriteTabular {
        /// Spreadsheet identifier
        #[arg(long, env = "SPREADSHEET_ID")]
        spreadsheet_id: Option<String>,

        /// Range in A1 notation
        #[arg(long, env = "RANGE_NAME", default_value = "Sheet1!A1")]
        range: String,

        /// Rows as JSON (array of arrays of scalars)
        #[arg(long, env = "SHEETS_DATA")]
        data: Option<String>,

        /// Read rows as JSON from a file instead
        #[arg(long, value_name = "PATH", conflicts_with = "data")]
        data_file: Option<PathBuf>,

        /// Append after the last populated row instead of overwriting
        #[arg(long, env = "APPEND")]
        append: bool,

        /// How the values are interpreted by the spreadsheet service
        #[arg(long, value_enum, default_value = "raw")]
        value_input: ValueInputArg,
    },

    /// Fetch a file from storage and write its rows to a spreadsheet
    FetchToTabular {
        /// File identifier in the remote store
        #[arg(long, env = "DRIVE_FILE_ID")]
        file_id: Option<String>,

        /// File name to look up (used when no file id is given)
        #[arg(long, env = "DRIVE_FILENAME")]
        file_name: Option<String>,

        /// Folder to scope the name lookup to
        #[arg(long, env = "DRIVE_FOLDER_ID")]
        folder_id: Option<String>,

        /// Spreadsheet identifier
        #[arg(long, env = "SPREADSHEET_ID")]
        spreadsheet_id: Option<String>,

        /// Destination range in A1 notation
        #[arg(long, env = "RANGE_NAME", default_value = "Sheet1!A1")]
        range: String,

        /// How to turn file content into rows
        #[arg(long, value_enum, default_value = "lines")]
        transform: TransformArg,

        /// Field delimiter for the csv transform
        #[arg(long, default_value = ",")]
        delimiter: char,
    },

    /// Export spreadsheet rows as a CSV file in storage
    TabulateToStore {
        /// Spreadsheet identifier
        #[arg(long, env = "SPREADSHEET_ID")]
        spreadsheet_id: Option<String>,

        /// Source range in A1 notation (whole sheet when omitted)
        #[arg(long, env = "RANGE_NAME")]
        range: Option<String>,

        /// Sheet name (used when no range is given)
        #[arg(long, env = "SHEET_NAME")]
        sheet: Option<String>,

        /// Name for the uploaded file
        #[arg(long, env = "OUTPUT_FILENAME", default_value = "export.csv")]
        output_name: String,

        /// Destination folder in the remote store
        #[arg(long, env = "DRIVE_FOLDER_ID")]
        folder_id: Option<String>,
    },

    /// List files in the remote store
    ListStorage {
        /// Folder to list
        #[arg(long, env = "DRIVE_FOLDER_ID")]
        folder_id: Option<String>,

        /// Drive query expression for filtering
        #[arg(long, env = "DRIVE_QUERY")]
        query: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Text,
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TransformArg {
    /// One single-cell row per line
    Lines,
    /// Parse delimited content
    Csv,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ValueInputArg {
    Raw,
    UserEntered,
}

impl From<ValueInputArg> for ValueInput {
    fn from(arg: ValueInputArg) -> Self {
        match arg {
            ValueInputArg::Raw => ValueInput::Raw,
            ValueInputArg::UserEntered => ValueInput::UserEntered,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("driveflow_client_core", log::LevelFilter::Debug)
            .filter_module("driveflow_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let debug = cli.debug;
    if let Err(error) = run(cli).await {
        eprintln!("{}", error.format_for_user(debug));
        std::process::exit(error.exit_code() as i32);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let config = get_config().map_err(|e| CliError::general(&format!("{e:#}")))?;

    let use_color =
        config.output.color_enabled && !cli.no_color && terminal::supports_ansi();
    if !use_color {
        colored::control::set_override(false);
    }

    // Parameter validation happens before credentials are touched, so a
    // missing identifier exits with zero remote calls.
    match cli.command {
        Commands::ReadTabular {
            spreadsheet_id,
            range,
            sheet,
            format,
        } => {
            let spreadsheet_id = require_spreadsheet_id(spreadsheet_id, &config)?;
            let formatter = resolve_format(format, &config)?.formatter(use_color);

            let workflow = connect(cli.credentials.as_deref(), &config).await?;
            TabularOrchestrator::new(&workflow)
                .read(
                    &spreadsheet_id,
                    range.as_deref(),
                    sheet.as_deref(),
                    formatter.as_ref(),
                )
                .await
        }

        Commands::WriteTabular {
            spreadsheet_id,
            range,
            data,
            data_file,
            append,
            value_input,
        } => {
            let spreadsheet_id = require_spreadsheet_id(spreadsheet_id, &config)?;
            let batch = parse_rows(data.as_deref(), data_file.as_deref())?;
            batch
                .ensure_rectangular()
                .map_err(|e| CliError::misuse(&e.to_string()))?;

            let workflow = connect(cli.credentials.as_deref(), &config).await?;
            TabularOrchestrator::new(&workflow)
                .write(&spreadsheet_id, &range, &batch, append, value_input.into())
                .await
        }

        Commands::FetchToTabular {
            file_id,
            file_name,
            folder_id,
            spreadsheet_id,
            range,
            transform,
            delimiter,
        } => {
            let spreadsheet_id = require_spreadsheet_id(spreadsheet_id, &config)?;
            let locator = resolve_locator(file_id, file_name, folder_id)?;
            let transform = build_transform(transform, delimiter)?;

            let workflow = connect(cli.credentials.as_deref(), &config).await?;
            TransferOrchestrator::new(&workflow)
                .fetch_to_tabular(&locator, &spreadsheet_id, &range, transform.as_ref())
                .await
        }

        Commands::TabulateToStore {
            spreadsheet_id,
            range,
            sheet,
            output_name,
            folder_id,
        } => {
            let spreadsheet_id = require_spreadsheet_id(spreadsheet_id, &config)?;
            let folder_id = folder_id.or_else(|| config.defaults.folder_id.clone());

            let workflow = connect(cli.credentials.as_deref(), &config).await?;
            TransferOrchestrator::new(&workflow)
                .tabulate_to_store(
                    &spreadsheet_id,
                    range.as_deref(),
                    sheet.as_deref(),
                    folder_id.as_deref(),
                    &output_name,
                )
                .await
        }

        Commands::ListStorage {
            folder_id,
            query,
            format,
        } => {
            let folder_id = folder_id.or_else(|| config.defaults.folder_id.clone());
            let formatter = resolve_format(format, &config)?.formatter(use_color);

            let workflow = connect(cli.credentials.as_deref(), &config).await?;
            StorageOrchestrator::new(&workflow)
                .list(folder_id.as_deref(), query.as_deref(), formatter.as_ref())
                .await
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

/// Authenticate and build the workflow; a bad or missing credential is
/// fatal before any operation runs.
async fn connect(credentials_path: Option<&Path>, config: &AppConfig) -> CliResult<Workflow> {
    let key = load_service_account_key(credentials_path)?;
    let credentials = Credentials::authorize_default(&key, &[DRIVE_SCOPE, SHEETS_SCOPE])
        .await
        .map_err(CliError::from)?;

    let client_config = ClientConfig {
        timeout_seconds: config.network.timeout_seconds,
        ..ClientConfig::default()
    };
    Workflow::new(client_config, Arc::new(credentials)).map_err(CliError::from)
}

fn load_service_account_key(path: Option<&Path>) -> CliResult<ServiceAccountKey> {
    if let Some(path) = path {
        return ServiceAccountKey::from_file(path)
            .map_err(|e| CliError::auth(&format!("failed to load credentials from {}: {e}", path.display())));
    }
    if let Ok(json) = std::env::var(driveflow_client_core::auth::CREDENTIALS_JSON_VAR) {
        return ServiceAccountKey::from_json(&json)
            .map_err(|e| CliError::auth(&format!("GOOGLE_CREDENTIALS_JSON is not usable: {e}")));
    }
    Err(CliError::auth(
        "no credentials provided; pass --credentials or set GOOGLE_APPLICATION_CREDENTIALS / GOOGLE_CREDENTIALS_JSON",
    ))
}

fn require_spreadsheet_id(arg: Option<String>, config: &AppConfig) -> CliResult<String> {
    arg.or_else(|| config.defaults.spreadsheet_id.clone())
        .ok_or_else(|| {
            CliError::misuse(
                "spreadsheet id is required; pass --spreadsheet-id or set SPREADSHEET_ID",
            )
        })
}

fn resolve_format(arg: Option<FormatArg>, config: &AppConfig) -> CliResult<OutputFormat> {
    match arg {
        Some(format) => Ok(format.into()),
        None => OutputFormat::from_string(&config.output.default_format)
            .map_err(|e| CliError::general(&e.to_string())),
    }
}

fn resolve_locator(
    file_id: Option<String>,
    file_name: Option<String>,
    folder_id: Option<String>,
) -> CliResult<FileLocator> {
    match (file_id, file_name) {
        (Some(id), _) => Ok(FileLocator::Id(id)),
        (None, Some(name)) => Ok(FileLocator::Name { name, folder_id }),
        (None, None) => Err(CliError::misuse(
            "a file locator is required; pass --file-id or --file-name (DRIVE_FILE_ID / DRIVE_FILENAME)",
        )),
    }
}

fn build_transform(arg: TransformArg, delimiter: char) -> CliResult<Box<dyn Transform>> {
    match arg {
        TransformArg::Lines => Ok(Box::new(LineRows)),
        TransformArg::Csv => {
            if !delimiter.is_ascii() {
                return Err(CliError::misuse("delimiter must be a single ASCII character"));
            }
            Ok(Box::new(DelimitedRows::new(delimiter as u8)))
        }
    }
}

/// Rows come from --data / SHEETS_DATA, a JSON file, or fall back to a
/// single status row.
fn parse_rows(data: Option<&str>, data_file: Option<&Path>) -> CliResult<RowBatch> {
    if let Some(json) = data {
        let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(json)
            .map_err(|e| CliError::misuse(&format!("rows are not valid JSON: {e}")))?;
        return Ok(RowBatch::new(rows));
    }
    if let Some(path) = data_file {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::general(&format!("failed to read {}: {e}", path.display())))?;
        let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(&contents)
            .map_err(|e| CliError::misuse(&format!("rows in {} are not valid JSON: {e}", path.display())))?;
        return Ok(RowBatch::new(rows));
    }
    Ok(RowBatch::from_strings(vec![
        vec!["Timestamp".to_string(), "Status".to_string(), "Message".to_string()],
        vec![
            chrono::Utc::now().to_rfc3339(),
            "Success".to_string(),
            "Workflow executed successfully".to_string(),
        ],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn test_require_spreadsheet_id_from_arg() {
        let id = require_spreadsheet_id(Some("abc".into()), &empty_config()).unwrap();
        assert_eq!(id, "abc");
    }

    #[test]
    fn test_require_spreadsheet_id_from_config() {
        let mut config = empty_config();
        config.defaults.spreadsheet_id = Some("from-config".into());
        let id = require_spreadsheet_id(None, &config).unwrap();
        assert_eq!(id, "from-config");
    }

    #[test]
    fn test_require_spreadsheet_id_missing() {
        let error = require_spreadsheet_id(None, &empty_config()).unwrap_err();
        assert_eq!(error.exit_code() as i32, 2);
    }

    #[test]
    fn test_resolve_locator_prefers_id() {
        let locator =
            resolve_locator(Some("f1".into()), Some("name.csv".into()), None).unwrap();
        assert_eq!(locator, FileLocator::Id("f1".into()));
    }

    #[test]
    fn test_resolve_locator_by_name() {
        let locator = resolve_locator(None, Some("name.csv".into()), Some("dir1".into())).unwrap();
        assert_eq!(
            locator,
            FileLocator::Name {
                name: "name.csv".into(),
                folder_id: Some("dir1".into()),
            }
        );
    }

    #[test]
    fn test_resolve_locator_missing_is_misuse() {
        let error = resolve_locator(None, None, None).unwrap_err();
        assert_eq!(error.exit_code() as i32, 2);
    }

    #[test]
    fn test_parse_rows_from_json() {
        let batch = parse_rows(Some(r#"[["a","b"],["c","d"]]"#), None).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_parse_rows_invalid_json_is_misuse() {
        let error = parse_rows(Some("not json"), None).unwrap_err();
        assert_eq!(error.exit_code() as i32, 2);
    }

    #[test]
    fn test_parse_rows_default_sample() {
        let batch = parse_rows(None, None).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.is_rectangular());
    }

    #[test]
    fn test_cli_parses_all_operations() {
        Cli::command().debug_assert();
    }
}
