// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use apigw_domains::{
    aws,
    config::{load_domains, DeploymentContext, DeploymentOptions, ServiceManifest},
    constants::TOKIO_WORKER_THREADS,
    manager::DomainManager,
    reconcilers::DomainReconciler,
};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Manage API Gateway custom domains for a serverless deployment.
#[derive(Debug, Parser)]
#[command(name = "apigw-domains", version, about)]
struct Cli {
    /// Path to the service manifest
    #[arg(long, global = true, default_value = "serverless.yml")]
    config: PathBuf,

    /// Deployment stage, overrides `provider.stage`
    #[arg(long, global = true)]
    stage: Option<String>,

    /// Deployment region, overrides `provider.region`
    #[arg(long, global = true)]
    region: Option<String>,

    /// AWS credentials profile
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Verbose logging, including underlying error chains
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the custom domains and their DNS records
    Create,
    /// Delete the custom domains and their DNS records
    Delete,
    /// Resolve domains and add their outputs to a compiled template
    PrepareOutputs {
        /// Compiled CloudFormation template (JSON), rewritten in place
        #[arg(long)]
        template: PathBuf,
    },
    /// Create or update the API mappings
    SetupMappings,
    /// Remove the API mappings
    RemoveMappings,
    /// Print the target of every existing domain
    Summary,
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("apigw-domains")
        .enable_all()
        .build()?;

    let debug = cli.debug;
    if let Err(e) = runtime.block_on(async_main(cli)) {
        if debug {
            error!(error = ?e, "Command failed");
        } else {
            error!(error = %e, "Command failed");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn initialize_logging(debug: bool) {
    // RUST_LOG wins over --debug; RUST_LOG_FORMAT=json switches to JSON output
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "apigw-domains", &mut std::io::stdout());
        return Ok(());
    }

    initialize_logging(cli.debug);
    debug!(config = %cli.config.display(), "Logging initialized");

    let manifest = ServiceManifest::load(&cli.config)?;
    let options = DeploymentOptions {
        stage: cli.stage.clone(),
        region: cli.region.clone(),
    };
    let ctx = Arc::new(DeploymentContext::from_manifest(&manifest, &options));
    let domains = load_domains(&manifest, &ctx)?;
    info!(
        service = %ctx.service,
        stage = %ctx.stage,
        region = %ctx.region,
        domains = domains.len(),
        "Loaded configuration"
    );

    let services = aws::connect(&ctx, cli.profile.as_deref()).await;
    let mut manager = DomainManager::new(DomainReconciler::new(ctx, services), domains);

    match cli.command {
        Command::Create => manager.create_domains().await?,
        Command::Delete => manager.delete_domains().await?,
        Command::SetupMappings => manager.setup_mappings().await?,
        Command::RemoveMappings => manager.remove_mappings().await?,
        Command::PrepareOutputs { template } => prepare_outputs(&mut manager, &template).await?,
        Command::Summary => {
            let summaries = manager.summary().await?;
            if summaries.is_empty() {
                info!("No custom domains exist yet");
            }
            for summary in summaries {
                println!("Domain Name: {}", summary.domain_name);
                println!("Target Domain: {}", summary.target_domain);
                if let Some(zone) = &summary.hosted_zone_id {
                    println!("Hosted Zone Id: {zone}");
                }
            }
        }
        Command::Completions { .. } => {}
    }

    Ok(())
}

/// Resolve domains, then write outputs for those that resolved even if others failed.
async fn prepare_outputs(manager: &mut DomainManager, path: &Path) -> Result<()> {
    let prepared = manager.prepare_domains().await;

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read template {}", path.display()))?;
    let mut template: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Unable to parse template {}", path.display()))?;

    manager.write_outputs(&mut template)?;

    let rendered = serde_json::to_string_pretty(&template)?;
    std::fs::write(path, rendered)
        .with_context(|| format!("Unable to write template {}", path.display()))?;
    info!(template = %path.display(), "Template outputs written");

    prepared?;
    Ok(())
}
