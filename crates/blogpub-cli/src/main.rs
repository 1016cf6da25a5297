mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "blogpub",
    about = "Generate tag and archive pages, open comment issues, and publish the blog",
    version,
    propagate_version = true
)]
struct Cli {
    /// Blog root (default: auto-detect from _publish.yml or .git/)
    #[arg(long, global = true, env = "BLOGPUB_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// GitHub token used to create issues and push
    #[arg(long, global = true, env = "GH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tag and archive index pages
    Generate,

    /// Open a comment issue for every post that has none
    Link,

    /// Generate, link, then commit and push any changes (default)
    Publish,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// `RUST_LOG` when it is set and parses, `info` otherwise.
fn log_filter(spec: Option<&str>) -> EnvFilter {
    spec.filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved blog root");
    let token = cli.token.as_deref();

    let result = match cli.command.unwrap_or(Commands::Publish) {
        Commands::Generate => cmd::generate::run(&root, cli.json),
        Commands::Link => cmd::link::run(&root, token, cli.json),
        Commands::Publish => cmd::publish::run(&root, token, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_level_is_used_as_given() {
        for spec in ["debug", "warn", "blogpub_core=trace"] {
            assert_eq!(
                log_filter(Some(spec)).to_string(),
                EnvFilter::new(spec).to_string()
            );
        }
    }

    #[test]
    fn unset_or_invalid_rust_log_falls_back_to_info() {
        let info = EnvFilter::new("info").to_string();
        assert_eq!(log_filter(None).to_string(), info);
        assert_eq!(log_filter(Some("  ")).to_string(), info);
        assert_eq!(log_filter(Some("blogpub=loudest")).to_string(), info);
    }
}
