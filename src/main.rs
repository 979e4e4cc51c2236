use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use addon_nightlies::{run, Config, DryRunTransport, GitHubClient, HttpTransport};

#[derive(Parser)]
#[command(name = "addon-nightlies")]
#[command(about = "Trigger nightly CI builds of add-ons against core master and the latest release")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, env = "NIGHTLIES_CONFIG", default_value = "src.json")]
    config: PathBuf,

    /// Append log output to this file instead of stdout
    #[arg(long, env = "NIGHTLIES_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Log the build requests instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("addon_nightlies=info".parse()?),
        )
        .with_ansi(cli.log_file.is_none())
        .with_writer(log_writer(cli.log_file.as_deref())?)
        .init();

    // Failures are only reported through the log; the process still exits normally
    if !cli.config.exists() {
        error!(
            path = %cli.config.display(),
            "Missing config file. It holds the project lists and credentials the nightly trigger needs."
        );
        return Ok(());
    }

    if let Err(err) = trigger(&cli).await {
        error!(error = ?err, "Nightly run aborted");
    }

    Ok(())
}

/// Stdout by default, or a file that is appended to and never rotated
fn log_writer(log_file: Option<&Path>) -> Result<BoxMakeWriter> {
    let Some(path) = log_file else {
        return Ok(BoxMakeWriter::new(std::io::stdout));
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    Ok(BoxMakeWriter::new(appender))
}

async fn trigger(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let github = GitHubClient::new(&config.github_token, &config.github_api_url)?;

    if cli.dry_run {
        info!("Dry run, no build requests will be sent");
        run(config, &github, DryRunTransport).await
    } else {
        run(config, &github, HttpTransport::new()).await
    }
}
