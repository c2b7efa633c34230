pub mod complexity;
pub mod config;
pub mod expansion;
pub mod logging;
pub mod render;
pub mod thread;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use once_cell::sync::Lazy;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::info;

use config::RenderConfig;
use expansion::ExpansionState;
use render::{Renderer, TruncationMode};

static LONG_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}\nbuilt: {}\ntarget: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown"),
    )
});

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "leetmate-render",
    version,
    long_version = LONG_VERSION.as_str(),
    about = "Render LeetMate discussion messages to safe, highlighted HTML"
)]
pub struct Cli {
    /// Config file (defaults to render.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a single message (file or stdin)
    Render {
        /// Message file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Show the full message even when it is long
        #[arg(long, default_value_t = false)]
        expanded: bool,

        /// Print fragment JSON instead of HTML
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Override the collapse threshold (characters)
        #[arg(long)]
        threshold: Option<usize>,

        /// Cut at exactly the threshold, even inside code blocks
        #[arg(long, default_value_t = false)]
        raw_truncation: bool,
    },
    /// Render a thread of messages (JSON lines)
    Thread {
        /// JSONL file, one message object per line
        input: PathBuf,

        /// Message ids to show expanded (repeatable)
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<String>,

        /// Print one JSON object per message instead of an HTML document
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write output to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Estimate cyclomatic complexity of a code snippet (file or stdin)
    Complexity {
        /// Code file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Print the full breakdown as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;
    run_with(cli).await
}

/// Execute an already parsed command line. Logging must be set up by the caller.
pub async fn run_with(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            input,
            expanded,
            json,
            threshold,
            raw_truncation,
        } => {
            let mut cfg = load_config(cli.config.as_deref())?;
            if let Some(n) = threshold {
                cfg.truncate_threshold = n;
            }
            if raw_truncation {
                cfg.truncation = TruncationMode::Raw;
            }
            cfg.validate().context("invalid render options")?;
            let text = read_input(input.as_deref()).await?;
            print!("{}", run_render(&cfg, &text, expanded, json)?);
            Ok(())
        }
        Commands::Thread {
            input,
            expand,
            json,
            output,
        } => {
            let cfg = load_config(cli.config.as_deref())?;
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("reading thread {}", input.display()))?;
            let out = run_thread(&cfg, &raw, ExpansionState::with_expanded(expand), json)?;
            match output {
                Some(path) => tokio::fs::write(&path, out)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{out}"),
            }
            Ok(())
        }
        Commands::Complexity { input, json } => {
            let code = read_input(input.as_deref()).await?;
            let report = complexity::analyze(&code);
            info!(
                component = "cli",
                operation = "complexity",
                complexity = report.complexity,
                "Complexity estimated"
            );
            if json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("{}", report.complexity);
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "leetmate-render", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    RenderConfig::load(path).context("loading render config")
}

async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("reading {}", p.display())),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

/// Render one message to HTML, or to `{is_truncatable, html, fragment}` JSON.
pub fn run_render(cfg: &RenderConfig, text: &str, expanded: bool, json: bool) -> Result<String> {
    let renderer = Renderer::new(cfg.render_options());
    let rendered = renderer.render(Some(text), expanded);
    info!(
        component = "cli",
        operation = "render",
        input_len = text.len(),
        expanded,
        is_truncatable = rendered.is_truncatable,
        "Message rendered"
    );
    if json {
        let value = json!({
            "is_truncatable": rendered.is_truncatable,
            "html": rendered.to_html(),
            "fragment": rendered.fragment,
        });
        Ok(format!("{}\n", serde_json::to_string(&value)?))
    } else {
        Ok(format!("{}\n", rendered.to_html()))
    }
}

/// Render a JSONL thread to an HTML document, or to JSON lines.
pub fn run_thread(
    cfg: &RenderConfig,
    input: &str,
    state: ExpansionState,
    json: bool,
) -> Result<String> {
    let messages = thread::load_thread(input)?;
    let renderer = Renderer::new(cfg.render_options());
    let rendered = thread::render_thread(&renderer, &messages, &state);
    if !json {
        return Ok(thread::thread_to_html(&messages, &rendered));
    }
    let mut out = String::new();
    for r in &rendered {
        out.push_str(&serde_json::to_string(r)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_thread_expand_flags() {
        let cli = Cli::try_parse_from([
            "leetmate-render",
            "thread",
            "t.jsonl",
            "--expand",
            "m1",
            "--expand",
            "m2",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Thread { expand, json, .. } => {
                assert_eq!(expand, vec!["m1", "m2"]);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_render_json_shape() {
        let out = run_render(&RenderConfig::default(), "`if`", false, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["is_truncatable"], false);
        assert_eq!(value["fragment"][0]["kind"], "code-inline");
        assert!(value["html"].as_str().unwrap().contains("tok-keyword"));
    }

    #[test]
    fn run_thread_json_lines() {
        let input = "{\"id\":\"a\",\"content\":\"x\"}\n{\"id\":\"b\",\"content\":\"y\"}\n";
        let out = run_thread(&RenderConfig::default(), input, ExpansionState::new(), true).unwrap();
        let ids: Vec<String> = out
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["id"].to_string())
            .collect();
        assert_eq!(ids, vec!["\"a\"", "\"b\""]);
    }
}
