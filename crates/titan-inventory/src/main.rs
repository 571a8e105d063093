// # titan-inventory - WebTitan Location Inventory
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add fetching, indexing or retry logic here
// - All client logic MUST be in titan-core / titan-oauth1
// - Configuration is via environment variables ONLY
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the signed transport and the session context
// 4. Running one aggregation pass and printing the result as JSON
//
// ## Configuration
//
// ### Credential
// - `TITAN_API_URL`: Appliance base URL (e.g. `https://titan.example.com`)
// - `TITAN_CONSUMER_KEY`: OAuth1 consumer key
// - `TITAN_CONSUMER_SECRET`: OAuth1 consumer secret
// - `TITAN_TOKEN_KEY`: OAuth1 token
// - `TITAN_TOKEN_SECRET`: OAuth1 token secret
//
// ### Session
// - `TITAN_REQUEST_TIMEOUT_SECS`: Per-request deadline, 0 disables (default 30)
// - `TITAN_FETCH_CONCURRENCY`: Accounts fetched at once (default 1)
//
// ### Logging
// - `TITAN_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `TITAN_LOG_ENCODING`: console or json (default console)
// - `TITAN_LOG_INCLUDE_CALLER`: true to add file and line to each event
//
// ## Example
//
// ```bash
// export TITAN_API_URL=https://titan.example.com
// export TITAN_CONSUMER_KEY=...
// export TITAN_CONSUMER_SECRET=...
// export TITAN_TOKEN_KEY=...
// export TITAN_TOKEN_SECRET=...
//
// titan-inventory > inventory.json
// ```
//
// The inventory goes to stdout; logs go to stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use titan_core::{
    AggregationReport, CustomerAccount, Location, LocationAggregator, LogEncoding,
    LoggingConfig, OAuthCredential, SessionConfig, TitanConfig, TitanContext,
};
use titan_oauth1::SigningClient;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Inventory printed (possibly with per-account failures)
/// - 1: Configuration or startup error
/// - 2: Runtime error (accounts could not be read)
#[derive(Debug, Clone, Copy)]
enum InventoryExitCode {
    /// Inventory printed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<InventoryExitCode> for ExitCode {
    fn from(code: InventoryExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    titan: TitanConfig,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let credential = OAuthCredential::new(
            required("TITAN_API_URL")?,
            required("TITAN_CONSUMER_KEY")?,
            required("TITAN_CONSUMER_SECRET")?,
            required("TITAN_TOKEN_KEY")?,
            required("TITAN_TOKEN_SECRET")?,
        );

        let mut session = SessionConfig::default();
        if let Some(value) = lookup("TITAN_REQUEST_TIMEOUT_SECS") {
            session.request_timeout_secs = value
                .parse()
                .with_context(|| format!("TITAN_REQUEST_TIMEOUT_SECS must be a number. Got: {}", value))?;
        }
        if let Some(value) = lookup("TITAN_FETCH_CONCURRENCY") {
            session.fetch_concurrency = value
                .parse()
                .with_context(|| format!("TITAN_FETCH_CONCURRENCY must be a number. Got: {}", value))?;
        }

        let mut logging = LoggingConfig::default();
        if let Some(level) = lookup("TITAN_LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(encoding) = lookup("TITAN_LOG_ENCODING") {
            logging.encoding = match encoding.to_lowercase().as_str() {
                "console" => LogEncoding::Console,
                "json" => LogEncoding::Json,
                _ => anyhow::bail!(
                    "TITAN_LOG_ENCODING '{}' is not supported. Supported encodings: console, json",
                    encoding
                ),
            };
        }
        if let Some(value) = lookup("TITAN_LOG_INCLUDE_CALLER") {
            logging.include_caller = matches!(value.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(Self {
            titan: TitanConfig {
                credential,
                session,
                logging,
            },
        })
    }

    /// Validate the configuration
    ///
    /// Credential fields are not checked beyond presence; the appliance
    /// rejects bad ones with 401/403.
    fn validate(&self) -> Result<()> {
        let url = &self.titan.credential.base_url;
        if !url.starts_with("https://") && !url.starts_with("http://") {
            anyhow::bail!("TITAN_API_URL must use HTTP or HTTPS scheme. Got: {}", url);
        }

        self.titan.validate()?;
        Ok(())
    }
}

/// What gets printed on stdout
#[derive(Debug, Serialize)]
struct InventoryOutput<'a> {
    accounts: &'a [CustomerAccount],
    locations: &'a [Location],
    locations_by_ip: BTreeMap<&'a str, &'a Location>,
    locations_by_name: BTreeMap<&'a str, &'a Location>,
    failures: Vec<FailedAccount>,
}

#[derive(Debug, Serialize)]
struct FailedAccount {
    account_id: i64,
    account_name: String,
    error: String,
}

impl<'a> InventoryOutput<'a> {
    fn new(aggregator: &'a LocationAggregator, report: &AggregationReport) -> Self {
        Self {
            accounts: aggregator.accounts(),
            locations: aggregator.locations(),
            locations_by_ip: aggregator.locations_by_ip().collect(),
            locations_by_name: aggregator.locations_by_name().collect(),
            failures: report
                .failures()
                .map(|(outcome, e)| FailedAccount {
                    account_id: outcome.account_id,
                    account_name: outcome.account_name.clone(),
                    error: e.to_string(),
                })
                .collect(),
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return InventoryExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return InventoryExitCode::ConfigError.into();
    }

    if let Err(e) = init_tracing(&config.titan.logging) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return InventoryExitCode::ConfigError.into();
    }

    info!("Starting titan-inventory");
    info!(
        "Configuration loaded: {:?}, {} account(s) at a time",
        config.titan.credential, config.titan.session.fetch_concurrency
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return InventoryExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_inventory(config).await {
            Ok(()) => InventoryExitCode::Success,
            Err(e) => {
                error!("Inventory error: {:#}", e);
                InventoryExitCode::RuntimeError
            }
        }
    })
    .into()
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_file(logging.include_caller)
        .with_line_number(logging.include_caller);

    match logging.encoding {
        LogEncoding::Console => tracing::subscriber::set_global_default(builder.finish()),
        LogEncoding::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    }
    .context("tracing subscriber already installed")
}

/// Run one aggregation pass and print the inventory
async fn run_inventory(config: Config) -> Result<()> {
    let transport = SigningClient::build(&config.titan.credential)?;
    let ctx = Arc::new(TitanContext::new(&config.titan, Arc::new(transport))?);

    // Ctrl-C cancels in-flight requests; the pass then finishes with failures
    let cancel = ctx.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received SIGINT, cancelling requests");
            cancel.cancel();
        }
    });

    let mut aggregator = LocationAggregator::new(Arc::clone(&ctx));
    let result = aggregator.aggregate().await;
    interrupt.abort();

    let report = result.context("Failed to aggregate locations")?;
    for (outcome, e) in report.failures() {
        warn!(
            "Account {} ({}) is missing from the inventory: {}",
            outcome.account_id, outcome.account_name, e
        );
    }

    let output = InventoryOutput::new(&aggregator, &report);
    let json = serde_json::to_string_pretty(&output).context("Failed to encode inventory")?;
    println!("{}", json);

    info!(
        "Printed {} location(s) from {} account(s)",
        report.location_count(),
        aggregator.accounts().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const CREDENTIAL: &[(&str, &str)] = &[
        ("TITAN_API_URL", "https://titan.test"),
        ("TITAN_CONSUMER_KEY", "ck"),
        ("TITAN_CONSUMER_SECRET", "cs"),
        ("TITAN_TOKEN_KEY", "tk"),
        ("TITAN_TOKEN_SECRET", "ts"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_unset() {
        let config = Config::from_lookup(lookup(CREDENTIAL)).unwrap();
        config.validate().unwrap();

        assert_eq!(config.titan.credential.base_url, "https://titan.test");
        assert_eq!(config.titan.session.request_timeout_secs, 30);
        assert_eq!(config.titan.session.fetch_concurrency, 1);
        assert_eq!(config.titan.logging.level, "info");
        assert_eq!(config.titan.logging.encoding, LogEncoding::Console);
    }

    #[test]
    fn missing_credential_field_is_rejected() {
        let err = Config::from_lookup(lookup(&CREDENTIAL[..4])).err().unwrap();
        assert!(err.to_string().contains("TITAN_TOKEN_SECRET"));
    }

    #[test]
    fn optional_vars_are_parsed() {
        let mut vars = CREDENTIAL.to_vec();
        vars.extend([
            ("TITAN_REQUEST_TIMEOUT_SECS", "5"),
            ("TITAN_FETCH_CONCURRENCY", "4"),
            ("TITAN_LOG_LEVEL", "debug"),
            ("TITAN_LOG_ENCODING", "JSON"),
            ("TITAN_LOG_INCLUDE_CALLER", "true"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.titan.session.request_timeout_secs, 5);
        assert_eq!(config.titan.session.fetch_concurrency, 4);
        assert_eq!(config.titan.logging.level, "debug");
        assert_eq!(config.titan.logging.encoding, LogEncoding::Json);
        assert!(config.titan.logging.include_caller);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut vars = CREDENTIAL.to_vec();
        vars.push(("TITAN_FETCH_CONCURRENCY", "many"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = CREDENTIAL.to_vec();
        vars.push(("TITAN_LOG_ENCODING", "logfmt"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = CREDENTIAL.to_vec();
        vars.push(("TITAN_FETCH_CONCURRENCY", "0"));
        assert!(Config::from_lookup(lookup(&vars)).unwrap().validate().is_err());

        let mut vars = CREDENTIAL.to_vec();
        vars[0] = ("TITAN_API_URL", "titan.test");
        assert!(Config::from_lookup(lookup(&vars)).unwrap().validate().is_err());
    }
}
