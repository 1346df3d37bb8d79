//! tryit - send one API operation from an OpenAPI document
//!
//! Loads the document, fills in parameters, body and credentials from the
//! command line and config, then prints the curl command and the response.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tryit_console::config::{config_dir, ConsoleConfig};
use tryit_console::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};
use tryit_console::{
    parse_openapi, ConsoleController, ConsoleOptions, ConsoleState, RequestExecutor,
    ReqwestTransport, ResponseRecord, SendInput, SendOutcome,
};

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version = APP_VERSION, about = "Try an API operation from an OpenAPI document")]
struct Cli {
    /// OpenAPI 3 or Swagger 2 document (JSON or YAML)
    document: PathBuf,

    /// operationId or "METHOD /path"; omit with --list
    operation: Option<String>,

    /// Parameter value, repeatable
    #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Request body text (JSON)
    #[arg(short, long, conflicts_with = "body_file")]
    body: Option<String>,

    /// Read the request body from a file
    #[arg(long, value_name = "FILE")]
    body_file: Option<PathBuf>,

    /// Extra header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Credential for a security scheme, repeatable
    #[arg(short, long = "token", value_name = "SCHEME=TOKEN", value_parser = parse_key_val)]
    tokens: Vec<(String, String)>,

    /// Index into the operation's server list
    #[arg(short, long)]
    server: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file (defaults to ~/.tryit/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the document's operations and exit
    #[arg(short, long)]
    list: bool,

    /// Print the curl command without sending
    #[arg(long)]
    curl_only: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConsoleConfig::load_from(path)?,
        None => ConsoleConfig::load()?,
    };

    // Initialize logging to file
    let log_dir = config_dir();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let document = parse_openapi(&cli.document)
        .with_context(|| format!("loading {}", cli.document.display()))?;
    tracing::info!(
        document = %cli.document.display(),
        operations = document.operations.len(),
        "Loaded API document"
    );

    if cli.list {
        for op in &document.operations {
            let id = op.operation_id.as_deref().unwrap_or("-");
            let deprecated = if op.deprecated { " (deprecated)" } else { "" };
            println!("{:<7} {:<40} {}{}", op.method, op.path, id, deprecated);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(selector) = cli.operation.as_deref() else {
        bail!("no operation given; use --list to see what the document declares");
    };
    let Some(found) = document.find_operation(selector) else {
        bail!("operation '{}' not found", selector);
    };
    let mut operation = found.clone();

    for (name, value) in &cli.params {
        match operation.parameter_mut(name) {
            Some(param) => param.value = value.clone(),
            None => bail!("operation {} has no parameter '{}'", operation.display_title(), name),
        }
    }

    let body_text = match (&cli.body, &cli.body_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        (None, None) => operation.body.as_ref().and_then(|b| b.example.clone()),
    };

    let cli_tokens: HashMap<&str, &str> = cli
        .tokens
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let security_schemes = document.schemes_with_tokens(|id| {
        cli_tokens.get(id).copied().or_else(|| config.token_for(id))
    });

    let mut additional_headers = config.additional_headers.clone();
    for (name, value) in &cli.headers {
        additional_headers.insert(name.clone(), value.clone());
    }

    let timeout = cli
        .timeout
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
    let transport = ReqwestTransport::new(timeout).context("building HTTP client")?;
    let controller = ConsoleController::new(
        RequestExecutor::new(transport),
        ConsoleOptions {
            additional_headers,
            security_schemes,
        },
    );

    let mut input = SendInput::new(&operation).server(cli.server.unwrap_or(config.server_index));
    if let Some(text) = body_text.as_deref() {
        input = input.body(text);
    }

    if cli.curl_only {
        let spec = controller.prepare(&input)?;
        println!("{}", spec.to_curl());
        return Ok(ExitCode::SUCCESS);
    }

    let mut states = controller.subscribe();
    tokio::spawn(async move {
        while let Some(state) = states.recv().await {
            match state {
                ConsoleState::Idle => {}
                ConsoleState::Sending { seq } => tracing::debug!(seq, "Sending"),
                ConsoleState::Settled { seq, .. } => tracing::debug!(seq, "Settled"),
            }
        }
    });

    match controller.send(input).await {
        Some(SendOutcome::Success(record)) => {
            print_record(&record);
            Ok(ExitCode::SUCCESS)
        }
        Some(SendOutcome::Failure(e)) => {
            eprintln!("error: {}", e);
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

fn print_record(record: &ResponseRecord) {
    println!("{}", record.curl);
    println!();
    println!(
        "HTTP {} {} ({} ms){}",
        record.status,
        record.status_text,
        record.elapsed_ms,
        if record.redirected { " [redirect not followed]" } else { "" }
    );
    for (name, value) in &record.headers {
        println!("{}: {}", name, value);
    }
    println!();
    println!("{}", record.body.display());

    if let Some(e) = &record.payload_error {
        eprintln!("warning: {}", e);
    }
}
