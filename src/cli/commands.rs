//! CLI command implementations
//!
//! Every command follows the same startup sequence:
//!
//! 1. Configuration load (optional file, defaults otherwise)
//! 2. Schema load (schema file or built-in catalog), registry frozen
//! 3. Fixture load into the in-memory lookup
//!
//! A failure in any step aborts before stdin is read.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::observability::{log_event, log_event_with_fields, Event, Logger, Severity};
use crate::schema::{catalog, EntityKind, SchemaLoader, SchemaRegistry};
use crate::document::Document;
use crate::validation::{DocumentValidator, FieldPolicy, MemoryLookup, ValidationMode};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_requests, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema definitions replacing the built-in catalog
    #[serde(default)]
    pub schema_file: Option<PathBuf>,

    /// Existing records, `{"<collection>": [<document>, ...]}`
    #[serde(default)]
    pub fixtures_file: Option<PathBuf>,

    /// Report fields not declared by the kind's definition
    #[serde(default)]
    pub strict_fields: bool,

    /// Lowest severity written to the log (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_file: None,
            fixtures_file: None,
            strict_fields: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        self.severity()?;

        for (name, file) in [
            ("schema_file", &self.schema_file),
            ("fixtures_file", &self.fixtures_file),
        ] {
            if let Some(file) = file {
                if !file.is_file() {
                    return Err(CliError::config_error(format!(
                        "{} '{}' does not exist",
                        name,
                        file.display()
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    pub fn policy(&self) -> FieldPolicy {
        if self.strict_fields {
            FieldPolicy::Strict
        } else {
            FieldPolicy::Open
        }
    }
}

/// The registry a command validates against
enum ActiveRegistry {
    Catalog(&'static SchemaRegistry),
    Loaded(SchemaRegistry),
}

impl ActiveRegistry {
    fn get(&self) -> &SchemaRegistry {
        match self {
            ActiveRegistry::Catalog(registry) => *registry,
            ActiveRegistry::Loaded(registry) => registry,
        }
    }
}

/// Everything a command needs after startup
struct Session {
    registry: ActiveRegistry,
    lookup: MemoryLookup,
    policy: FieldPolicy,
}

impl Session {
    fn validator(&self) -> CliResult<DocumentValidator<'_>> {
        Ok(DocumentValidator::new(self.registry.get())?.with_policy(self.policy))
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Kinds { config } => kinds(config.as_deref()),
        Command::Export { config, output } => export(config.as_deref(), output.as_deref()),
        Command::Validate {
            config,
            kind,
            partial,
        } => validate(config.as_deref(), &kind, mode_for(partial)),
        Command::Check { config } => check(config.as_deref()),
    }
}

/// List entity kinds with their required fields
pub fn kinds(config_path: Option<&Path>) -> CliResult<()> {
    let session = start(config_path)?;
    write_response(kinds_listing(session.registry.get()))
}

/// Print or save the active definitions
pub fn export(config_path: Option<&Path>, output: Option<&Path>) -> CliResult<()> {
    let session = start(config_path)?;
    let registry = session.registry.get();

    match output {
        Some(path) => {
            SchemaLoader::save_file(registry, path)?;
            write_response(json!({ "written": path.display().to_string() }))
        }
        None => {
            let definitions: Vec<_> = registry.definitions().collect();
            write_response(serde_json::to_value(definitions)?)
        }
    }
}

/// Validate a single document from stdin
pub fn validate(config_path: Option<&Path>, kind: &str, mode: ValidationMode) -> CliResult<()> {
    let session = start(config_path)?;
    let kind: EntityKind = kind.parse()?;
    let document = Document::from_json(&read_request()?)?;

    let validator = session.validator()?;
    let result = validator.validate_in(mode, kind, &document, &session.lookup)?;
    write_response(serde_json::to_value(result)?)
}

fn mode_for(partial: bool) -> ValidationMode {
    if partial {
        ValidationMode::Partial
    } else {
        ValidationMode::Full
    }
}

/// Validate newline-delimited requests; one response line per request
pub fn check(config_path: Option<&Path>) -> CliResult<()> {
    let session = start(config_path)?;
    let validator = session.validator()?;
    log_event(Event::CheckBegin);

    for request in read_requests() {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                write_error(e.code(), &e.message())?;
                if ends_batch(&e) {
                    break;
                }
                continue;
            }
        };

        match check_one(&validator, &session.lookup, &request) {
            Ok(data) => write_response(data)?,
            Err(e) => write_error(e.code(), &e.message())?,
        }
    }

    let snapshot = validator.metrics().snapshot();
    let validated = snapshot.documents_validated.to_string();
    let rejected = snapshot.documents_rejected.to_string();
    let failures = snapshot.lookup_failures.to_string();
    log_event_with_fields(
        Event::CheckComplete,
        &[
            ("lookup_failures", failures.as_str()),
            ("rejected", rejected.as_str()),
            ("validated", validated.as_str()),
        ],
    );
    Ok(())
}

/// Only a failed read of stdin ends the batch; a bad line is answered inline.
fn ends_batch(error: &CliError) -> bool {
    matches!(error, CliError::Io(_))
}

#[derive(Debug, Deserialize)]
struct CheckRequest {
    kind: String,
    document: Value,
    #[serde(default)]
    partial: bool,
}

fn check_one(
    validator: &DocumentValidator<'_>,
    lookup: &MemoryLookup,
    request: &Value,
) -> CliResult<Value> {
    let request = CheckRequest::deserialize(request)
        .map_err(|e| CliError::invalid_request(format!("Invalid check request: {}", e)))?;
    let kind: EntityKind = request.kind.parse()?;
    let document = Document::from_json(&request.document)?;

    let result = validator.validate_in(mode_for(request.partial), kind, &document, lookup)?;
    Ok(json!({
        "kind": kind,
        "result": result,
    }))
}

fn kinds_listing(registry: &SchemaRegistry) -> Value {
    let kinds: Vec<Value> = registry
        .definitions()
        .map(|definition| {
            let required: Vec<&str> = definition.required_fields().collect();
            json!({
                "kind": definition.kind.name(),
                "collection": definition.kind.collection_name(),
                "required": required,
            })
        })
        .collect();
    Value::Array(kinds)
}

/// Startup sequence; logs `STARTUP_FAILED` before returning any error
fn start(config_path: Option<&Path>) -> CliResult<Session> {
    boot(config_path).map_err(|e| {
        log_event_with_fields(
            Event::StartupFailed,
            &[("code", e.code()), ("message", e.message().as_str())],
        );
        e
    })
}

fn boot(config_path: Option<&Path>) -> CliResult<Session> {
    let config = Config::resolve(config_path)?;
    Logger::set_min_level(config.severity()?);

    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    log_event_with_fields(Event::ConfigLoaded, &[("source", source.as_str())]);

    let registry = match &config.schema_file {
        Some(path) => ActiveRegistry::Loaded(SchemaLoader::load_file(path)?),
        None => ActiveRegistry::Catalog(catalog::shared()?),
    };

    let lookup = match &config.fixtures_file {
        Some(path) => load_fixtures(path)?,
        None => MemoryLookup::new(),
    };

    Ok(Session {
        registry,
        lookup,
        policy: config.policy(),
    })
}

fn load_fixtures(path: &Path) -> CliResult<MemoryLookup> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::config_error(format!("Failed to read fixtures: {}", e)))?;
    let fixtures: Value = serde_json::from_str(&content)
        .map_err(|e| CliError::config_error(format!("Invalid fixtures JSON: {}", e)))?;

    let lookup = MemoryLookup::from_fixtures(&fixtures)?;

    let records: usize = EntityKind::ALL.iter().map(|kind| lookup.count(*kind)).sum();
    let records = records.to_string();
    let display = path.display().to_string();
    log_event_with_fields(
        Event::FixturesLoaded,
        &[("path", display.as_str()), ("records", records.as_str())],
    );
    Ok(lookup)
}
