//! adeploy CLI
//!
//! Command-line interface for deploying build artifacts to the
//! artifact-hosting service.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use adeploy::config::DeployConfig;
use adeploy::deploy::Deployer;
use adeploy::error::DeployError;
use adeploy::export::{EnvmanExporter, OutputExporter, PUBLIC_PAGE_KEY};
use adeploy_meta::{AaptBadging, ZipIpaReader};

#[derive(Parser)]
#[command(name = "adeploy")]
#[command(about = "Deploy build artifacts to an artifact-hosting service", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the artifact-hosting service
    #[arg(long, env = "ADEPLOY_BASE_URL")]
    base_url: String,

    /// API token authorizing the upload
    #[arg(long, env = "ADEPLOY_API_TOKEN", hide_env_values = true)]
    api_token: String,

    /// File or directory to deploy
    #[arg(long)]
    deploy_path: PathBuf,

    /// User groups to notify once the artifact is live (`none` disables)
    #[arg(long)]
    notify_user_groups: Option<String>,

    /// Email addresses to notify once the artifact is live
    #[arg(long)]
    notify_emails: Option<String>,

    /// Request a public install page for application packages
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    public_page: bool,

    /// Compress a directory into a single zip before uploading
    #[arg(long)]
    compress: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let deploy_path = std::path::absolute(&cli.deploy_path).unwrap_or(cli.deploy_path);
    let config = DeployConfig {
        base_url: cli.base_url,
        api_token: cli.api_token,
        deploy_path,
        notify_user_groups: cli.notify_user_groups,
        notify_emails: cli.notify_emails,
        public_page: cli.public_page,
        compress: cli.compress,
    };
    config.log();

    let deployer = Deployer::new(config, AaptBadging::from_env(), ZipIpaReader);

    match deployer.run().await {
        Ok(url) => {
            if let Err(err) = EnvmanExporter.export(PUBLIC_PAGE_KEY, &url) {
                fail(err);
            }
            println!();
            println!("[{}] deploy finished", "✔".bright_green().bold());
            if !url.is_empty() {
                println!(
                    "[{}] public install page: {}",
                    "+".bright_blue().bold(),
                    url
                );
            }
        }
        Err(err) => fail(err),
    }
}

fn fail(err: DeployError) -> ! {
    eprintln!("[{}] {}", "〤".bright_red().bold(), err);
    std::process::exit(1);
}
