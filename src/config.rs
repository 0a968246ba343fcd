//! Configuration types for catalog-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Catalog source selection (HTTP API or fixture directory)

use crate::catalog::http::{DEFAULT_PRODUCTS_URL_PREFIX, DEFAULT_TREE_URL};
use crate::error::ConfigError;
use crate::walker::{EnrichOptions, StatsOptions, DEFAULT_POOL_SIZE, DEFAULT_QUEUE_SIZE};
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 256;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 1;

/// Country codes are 2 or 3 letters (ISO 3166 alpha-2 / alpha-3)
static ORIGIN_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,3}$").expect("Invalid origin code regex"));

/// Endpoints must be absolute http(s) URLs
static ENDPOINT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/]+\S*$").expect("Invalid endpoint regex"));

/// Annotate a product-category tree with per-category product statistics
#[derive(Parser, Debug, Clone)]
#[command(
    name = "catalog-walker",
    version,
    about = "Annotate a product-category tree with per-category product statistics",
    long_about = "Fetches the category tree from the catalog API, then fetches every category's \
                  product list with a fixed pool of workers and adds countOwn, topProducts and \
                  originPercentage to each category.\n\n\
                  The enriched tree is written as JSON once every category has been processed. \
                  Any failed fetch aborts the run and nothing is written.",
    after_help = "EXAMPLES:\n    \
        catalog-walker -o tree.json\n    \
        catalog-walker -w 12 --origin DK --top 10\n    \
        catalog-walker --from-dir ./snapshot --compact\n    \
        catalog-walker --deadline 120 -q > tree.json"
)]
pub struct CliArgs {
    /// Number of concurrent workers (concurrent product fetches)
    #[arg(short = 'w', long, default_value_t = DEFAULT_POOL_SIZE, value_name = "NUM")]
    pub workers: usize,

    /// Work queue size
    #[arg(long, default_value_t = DEFAULT_QUEUE_SIZE, value_name = "NUM")]
    pub queue_size: usize,

    /// Country code counted by originPercentage (case-sensitive)
    #[arg(long = "origin", default_value = "SE", value_name = "CODE")]
    pub origin: String,

    /// Number of best sellers kept per category
    #[arg(long = "top", default_value_t = 5, value_name = "NUM")]
    pub top: usize,

    /// Abort the run if it takes longer than this
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Category tree endpoint
    #[arg(long, default_value = DEFAULT_TREE_URL, value_name = "URL")]
    pub tree_url: String,

    /// Product list endpoint; the category id is appended
    #[arg(long = "products-url", default_value = DEFAULT_PRODUCTS_URL_PREFIX, value_name = "URL")]
    pub products_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// Read categoryTree.json and <id>.json from a directory instead of the API
    #[arg(long, value_name = "DIR", conflicts_with_all = ["tree_url", "products_url"])]
    pub from_dir: Option<PathBuf>,

    /// Write the enriched tree here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit compact JSON instead of indented
    #[arg(long)]
    pub compact: bool,

    /// Quiet mode - suppress progress and summary output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Where catalog payloads come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// The catalog HTTP API
    Http {
        tree_url: String,
        products_url_prefix: String,
        timeout: Duration,
    },

    /// Saved payloads in a directory
    Directory(PathBuf),
}

impl SourceConfig {
    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            SourceConfig::Http { tree_url, .. } => tree_url.clone(),
            SourceConfig::Directory(dir) => dir.display().to_string(),
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Catalog source
    pub source: SourceConfig,

    /// Engine tunables
    pub enrich: EnrichOptions,

    /// Output file (stdout if unset)
    pub output_path: Option<PathBuf>,

    /// Indent the JSON output
    pub pretty: bool,

    /// Show progress indicator and summary
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // Validate queue size
        if args.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        if args.top == 0 {
            return Err(ConfigError::InvalidTopCount { count: args.top });
        }

        if !ORIGIN_CODE_REGEX.is_match(&args.origin) {
            return Err(ConfigError::InvalidOriginCode { code: args.origin });
        }

        let source = match args.from_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(ConfigError::InvalidFixtureDir {
                        path: dir,
                        reason: "not a directory".to_string(),
                    });
                }
                SourceConfig::Directory(dir)
            }
            None => {
                validate_endpoint(&args.tree_url)?;
                validate_endpoint(&args.products_url)?;
                SourceConfig::Http {
                    tree_url: args.tree_url,
                    products_url_prefix: args.products_url,
                    timeout: Duration::from_secs(args.timeout),
                }
            }
        };

        // Validate output path
        if let Some(output) = &args.output {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(ConfigError::InvalidOutputPath {
                        path: output.clone(),
                        reason: format!("Parent directory '{}' does not exist", parent.display()),
                    });
                }
            }
        }

        Ok(Self {
            source,
            enrich: EnrichOptions {
                pool_size: args.workers,
                queue_size: args.queue_size,
                stats: StatsOptions {
                    top_n: args.top,
                    target_origin: args.origin,
                },
                deadline: args.deadline.map(Duration::from_secs),
            },
            output_path: args.output,
            pretty: !args.compact,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}

fn validate_endpoint(url: &str) -> Result<(), ConfigError> {
    if ENDPOINT_REGEX.is_match(url) {
        Ok(())
    } else {
        Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: "expected an absolute http:// or https:// URL".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("catalog-walker").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = WalkConfig::from_args(parse(&[])).unwrap();

        assert_eq!(config.enrich.pool_size, 6);
        assert_eq!(config.enrich.stats.top_n, 5);
        assert_eq!(config.enrich.stats.target_origin, "SE");
        assert!(config.enrich.deadline.is_none());
        assert!(config.pretty);
        assert!(config.show_progress);
        assert_eq!(
            config.source,
            SourceConfig::Http {
                tree_url: DEFAULT_TREE_URL.to_string(),
                products_url_prefix: DEFAULT_PRODUCTS_URL_PREFIX.to_string(),
                timeout: Duration::from_secs(30),
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = WalkConfig::from_args(parse(&[
            "-w", "12", "--origin", "DK", "--top", "10", "--deadline", "90", "--compact", "-q",
        ]))
        .unwrap();

        assert_eq!(config.enrich.pool_size, 12);
        assert_eq!(config.enrich.stats.target_origin, "DK");
        assert_eq!(config.enrich.stats.top_n, 10);
        assert_eq!(config.enrich.deadline, Some(Duration::from_secs(90)));
        assert!(!config.pretty);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_invalid_worker_count() {
        let err = WalkConfig::from_args(parse(&["-w", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { count: 0, .. }));

        let err = WalkConfig::from_args(parse(&["-w", "1000"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { count: 1000, .. }));
    }

    #[test]
    fn test_invalid_top_and_queue() {
        assert!(matches!(
            WalkConfig::from_args(parse(&["--top", "0"])).unwrap_err(),
            ConfigError::InvalidTopCount { .. }
        ));
        assert!(matches!(
            WalkConfig::from_args(parse(&["--queue-size", "0"])).unwrap_err(),
            ConfigError::InvalidQueueSize { .. }
        ));
    }

    #[test]
    fn test_origin_code_validation() {
        assert!(WalkConfig::from_args(parse(&["--origin", "SWE"])).is_ok());
        assert!(matches!(
            WalkConfig::from_args(parse(&["--origin", "S3"])).unwrap_err(),
            ConfigError::InvalidOriginCode { .. }
        ));
        assert!(WalkConfig::from_args(parse(&["--origin", "Sweden"])).is_err());
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(matches!(
            WalkConfig::from_args(parse(&["--tree-url", "mat.se/tree"])).unwrap_err(),
            ConfigError::InvalidEndpoint { .. }
        ));
        assert!(WalkConfig::from_args(parse(&["--tree-url", "http://localhost:8080/tree"])).is_ok());
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        let config = WalkConfig::from_args(parse(&["--from-dir", path])).unwrap();
        assert_eq!(config.source, SourceConfig::Directory(dir.path().to_path_buf()));

        let err = WalkConfig::from_args(parse(&["--from-dir", "/definitely/not/here"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFixtureDir { .. }));

        // A fixture directory replaces the API endpoints
        assert!(CliArgs::try_parse_from([
            "catalog-walker",
            "--from-dir",
            path,
            "--tree-url",
            "http://localhost/tree",
        ])
        .is_err());
    }

    #[test]
    fn test_output_parent_must_exist() {
        let err = WalkConfig::from_args(parse(&["-o", "/definitely/not/here/tree.json"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOutputPath { .. }));
    }
}
