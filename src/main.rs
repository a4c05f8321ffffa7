//! SOAP fault inspection tool.
//!
//! Run with: `soap-fault --namespace urn:schemas-cybersource-com:transaction-data-1.129 fault.xml`

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use soap_fault::{FaultConfig, FaultDocument, FaultExtractor, QualifiedName};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Extract the code, message and request ID from a SOAP fault document.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Fault document to read, or "-" for stdin
    file: PathBuf,

    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Namespace of the requestID element (overrides the config file)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
}

/// Printable view of an extracted fault.
#[derive(Debug, Serialize)]
struct FaultReport<'a> {
    code: &'a QualifiedName,
    message: &'a str,
    request_id: Option<&'a str>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args.log_level.parse().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = if args.config.exists() {
        let content = std::fs::read_to_string(&args.config)
            .with_context(|| format!("Failed to read config file {}", args.config.display()))?;
        serde_yaml::from_str(&content).context("Failed to parse config file")?
    } else {
        info!("Config file not found, using defaults");
        FaultConfig::default()
    };

    let namespace = args
        .namespace
        .unwrap_or_else(|| config.request_id_namespace.clone());

    let data = read_input(&args.file)?;
    let document = FaultDocument::from_bytes(&data, &config.document)
        .with_context(|| format!("Failed to load fault document {}", args.file.display()))?;

    if !document.is_soap_fault()? {
        warn!("Document has no SOAP Fault element, extracting anyway");
    }

    let extractor = FaultExtractor::new(config);
    let fault = extractor
        .extract(&document, &namespace)
        .context("Failed to extract fault")?;

    info!(bytes = document.len(), namespace = %namespace, "Fault extracted");

    let report = FaultReport {
        code: fault.code(),
        message: fault.message(),
        request_id: fault.request_id(),
    };

    match args.format {
        OutputFormat::Text => {
            println!("code:       {}", report.code);
            println!("message:    {}", report.message);
            println!("request_id: {}", report.request_id.unwrap_or("-"));
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&report).context("Failed to render report")?);
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read stdin")?;
        Ok(data)
    } else {
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}
