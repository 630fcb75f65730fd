//! `coursecraft` command-line client.
//!
//! ```bash
//! coursecraft --subject "Leadership basics" --audience Managers --duration "1 day"
//! COURSECRAFT_API_URL=https://courses.example.com coursecraft --subject Negotiation --preview -o negotiation.md
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use coursecraft_client::{HttpGenerationApi, Poller, PollerConfig};
use coursecraft_core::course::{FormData, GenerationType};
use tracing_subscriber::EnvFilter;

/// Generate course materials through a CourseCraft server.
#[derive(Debug, Parser)]
#[command(name = "coursecraft", version)]
struct Cli {
    /// Server root URL.
    #[arg(long, env = "COURSECRAFT_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Access token; generations are charged to this account.
    #[arg(long, env = "COURSECRAFT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long)]
    subject: String,
    #[arg(long, default_value = "")]
    level: String,
    #[arg(long, default_value = "")]
    audience: String,
    #[arg(long, default_value = "")]
    duration: String,
    #[arg(long, default_value = "")]
    tone: String,
    #[arg(long, default_value = "")]
    language: String,
    #[arg(long, default_value = "")]
    context: String,

    /// Lesson plan only. Does not count against the quota.
    #[arg(long)]
    preview: bool,

    /// Write the Markdown here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds between status checks.
    #[arg(long, default_value_t = 3)]
    interval_secs: u64,

    /// Give up after this many seconds.
    #[arg(long, default_value_t = 90)]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn form_data(&self) -> FormData {
        FormData {
            subject: self.subject.clone(),
            level: self.level.clone(),
            audience: self.audience.clone(),
            duration: self.duration.clone(),
            tone: self.tone.clone(),
            language: self.language.clone(),
            context: self.context.clone(),
            generation_type: self.preview.then_some(GenerationType::Preview),
        }
    }

    fn poller_config(&self) -> PollerConfig {
        let defaults = PollerConfig::default();
        let poll_timeout = Duration::from_secs(self.timeout_secs);
        PollerConfig {
            interval: Duration::from_secs(self.interval_secs),
            poll_timeout,
            // Keep the safety margin above the poll timeout.
            safety_timeout: defaults.safety_timeout.max(poll_timeout + Duration::from_secs(30)),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("coursecraft_client=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let mut api = HttpGenerationApi::new(&cli.api_url);
    if let Some(token) = &cli.token {
        api = api.with_token(token);
    }
    let poller = Poller::new(api, cli.poller_config());

    let form = cli.form_data();
    let client_info = serde_json::json!({
        "client": "coursecraft-cli",
        "version": env!("CARGO_PKG_VERSION"),
    });

    let materials = poller
        .generate(&form, &client_info, |p| {
            eprintln!("[{:>3}%] {}", p.percent, p.message);
        })
        .await
        .context("course generation failed")?;

    let markdown = materials.to_markdown(&form.title());
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &markdown)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {} sections to {}", materials.sections.len(), path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(())
}
