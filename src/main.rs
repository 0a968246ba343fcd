//! catalog-walker - Product Category Tree Enrichment
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use catalog_walker::catalog::{CatalogClient, DirectorySource, ProductSource, TreeSource};
use catalog_walker::config::{CliArgs, SourceConfig, WalkConfig};
use catalog_walker::progress::{print_header, print_summary, ProgressReporter};
use catalog_walker::walker::EnrichCoordinator;
use catalog_walker::{Category, WalkerError};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.source.describe(),
            config.enrich.pool_size,
            &config.enrich.stats.target_origin,
            config.enrich.stats.top_n,
        );
    }

    match &config.source {
        SourceConfig::Http {
            tree_url,
            products_url_prefix,
            timeout,
        } => {
            let client = CatalogClient::builder()
                .tree_url(tree_url.as_str())
                .products_url_prefix(products_url_prefix.as_str())
                .timeout(*timeout)
                .build()
                .context("Failed to initialize catalog client")?;
            run_with(&config, &client, &client)
        }
        SourceConfig::Directory(dir) => {
            let source = DirectorySource::new(dir);
            run_with(&config, &source, &source)
        }
    }
}

fn run_with<T, P>(config: &WalkConfig, trees: &T, products: &P) -> Result<()>
where
    T: TreeSource,
    P: ProductSource,
{
    let coordinator = EnrichCoordinator::new(config.enrich.clone());

    // Setup signal handler for graceful shutdown
    let cancel = coordinator.cancel_token();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        cancel.fail(WalkerError::Interrupted);
    })
    .context("Failed to set signal handler")?;

    // Create progress reporter
    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    if let Some(ref p) = progress {
        p.set_status("Fetching category tree...");
    }

    info!(source = %config.source.describe(), "Fetching category tree");
    let mut tree = trees.fetch_tree().context("Can't fetch category tree")?;

    // Run the enrichment
    let result = coordinator.run_with_progress(&mut tree, products, |snapshot| {
        if let Some(ref p) = progress {
            p.update(snapshot);
        }
    });

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            if let Some(ref p) = progress {
                p.finish("Enrichment failed");
            }
            // The partially enriched tree is dropped here; nothing is emitted
            return Err(e).context("Can't process categories");
        }
    };

    if let Some(ref p) = progress {
        p.finish("Enrichment completed");
    }

    write_tree(&tree, config).context("Failed to write output")?;

    if config.show_progress {
        let output = config
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());
        print_summary(stats.categories, stats.products, stats.duration, &output);
    }

    Ok(())
}

/// Serialize the enriched tree in one go
fn write_tree(tree: &Category, config: &WalkConfig) -> Result<()> {
    let mut out: Box<dyn Write> = match &config.output_path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Can't create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if config.pretty {
        serde_json::to_writer_pretty(&mut out, tree)?;
    } else {
        serde_json::to_writer(&mut out, tree)?;
    }
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("catalog_walker=debug,warn")
    } else {
        EnvFilter::new("catalog_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
