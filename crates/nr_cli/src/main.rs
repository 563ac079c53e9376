use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use nr_core::{InferenceModel, ReportStorage, Result};
use nr_feeds::feed::{DEFAULT_FEED_URL, DEFAULT_SOURCE_NAME};
use nr_feeds::{run_periodic, FeedConfig, IntervalTicker, OverlapPolicy, ReportManager, RssSource};
use nr_inference::chat::DEFAULT_HISTORY_TURNS;
use nr_inference::corpus::DEFAULT_MAX_CORPUS_CHARS;
use nr_inference::{create_model, ChatAgent, CorpusBuilder, InferenceConfig, ModelBackend};
use nr_storage::{create_storage, StorageConfig, StorageKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Debug, Clone, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        let overflow = || "Duration is too large".to_string();

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if !current_number.is_empty() {
                let num = current_number.parse::<u64>().map_err(|_| overflow())?;
                let unit_seconds = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit_seconds)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(overflow)?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // a trailing number without unit counts as seconds
        if !current_number.is_empty() {
            let num = current_number.parse::<u64>().map_err(|_| overflow())?;
            total_seconds = total_seconds.checked_add(num).ok_or_else(overflow)?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Topic news reports and grounded chat on a local language model", long_about = None)]
struct Cli {
    /// Topic keyword to monitor
    #[arg(long, env = "TOPIC", default_value = "AI", global = true)]
    topic: String,
    /// Maximum number of articles to use per report
    #[arg(long, default_value_t = 5, global = true)]
    max_articles: usize,
    /// RSS feed to read [env: NR_FEED_URL, or the older BBC_TECH_FEED_URL] [default: BBC Technology]
    #[arg(long, env = "NR_FEED_URL", hide_env = true, global = true)]
    feed_url: Option<String>,
    #[arg(long, default_value = DEFAULT_SOURCE_NAME, global = true)]
    source_name: String,
    #[arg(long, default_value = "ollama", global = true, help = "Model to use for inference. Available models: ollama (default), langchain, dummy")]
    model: String,
    /// Ollama endpoint and model, e.g. http://localhost:11434/llama3
    #[arg(long, env = "NR_MODEL_URL", global = true)]
    model_url: Option<String>,
    /// Overrides the model named in --model-url
    #[arg(long, env = "OLLAMA_MODEL", global = true)]
    ollama_model: Option<String>,
    /// Extra attempts after a failed model request
    #[arg(long, default_value_t = 2, global = true)]
    model_retries: u32,
    #[arg(long, default_value = "file", global = true, help = "Report storage. Available: file (default), memory")]
    storage: String,
    #[arg(long, env = "NR_REPORTS_DIR", default_value = "reports", global = true)]
    reports_dir: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MAX_CORPUS_CHARS, global = true)]
    max_corpus_chars: usize,
    /// Chat turns kept as context (a question and its answer are two turns)
    #[arg(long, default_value_t = DEFAULT_HISTORY_TURNS, global = true)]
    history_turns: usize,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Commands {
    /// Generate a single report
    Report,
    /// Chat about the latest report
    Chat,
    /// Generate a report now and then on every interval
    Hourly {
        /// Interval between cycles (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long, default_value = "1h")]
        interval: HumanDuration,
        /// Stop after this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,
        /// Run missed cycles back-to-back instead of skipping them
        #[arg(long)]
        queue_missed: bool,
    },
    /// Generate one report and then chat about it (default)
    Demo,
    /// List stored reports
    List,
}

impl Cli {
    fn storage_config(&self) -> Result<StorageConfig> {
        Ok(StorageConfig {
            kind: self.storage.parse::<StorageKind>()?,
            reports_dir: self.reports_dir.clone(),
        })
    }

    fn inference_config(&self) -> Result<InferenceConfig> {
        Ok(InferenceConfig {
            backend: self.model.parse::<ModelBackend>()?,
            model_url: self.model_url.clone(),
            model_name: self.ollama_model.clone(),
            max_retries: self.model_retries,
            ..Default::default()
        })
    }

    fn feed_url(&self) -> String {
        resolve_feed_url(self.feed_url.clone(), std::env::var(LEGACY_FEED_URL_ENV).ok())
    }

    fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            feed_url: self.feed_url(),
            source_name: self.source_name.clone(),
            ..Default::default()
        }
    }
}

/// Older deployments set the feed through this variable.
const LEGACY_FEED_URL_ENV: &str = "BBC_TECH_FEED_URL";

/// `--feed-url`/`NR_FEED_URL` first, then the legacy variable, then the default feed.
fn resolve_feed_url(flag_or_env: Option<String>, legacy_env: Option<String>) -> String {
    flag_or_env
        .or(legacy_env)
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FEED_URL.to_string())
}

fn build_manager(
    cli: &Cli,
    inference: Arc<dyn InferenceModel>,
    storage: Arc<dyn ReportStorage>,
) -> Result<ReportManager> {
    let source = Arc::new(RssSource::new(&cli.feed_config())?);
    info!("🦗 Article source ready ({} at {})", cli.source_name, cli.feed_url());
    Ok(ReportManager::new(
        source,
        inference,
        storage,
        CorpusBuilder::new(cli.max_corpus_chars),
    ))
}

async fn chat(cli: &Cli, inference: Arc<dyn InferenceModel>, storage: Arc<dyn ReportStorage>) -> Result<()> {
    let mut agent = ChatAgent::start(inference, storage, cli.history_turns).await?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    repl::chat_loop(&mut agent, input, &mut output).await
}

async fn run(cli: Cli) -> Result<()> {
    let storage = create_storage(&cli.storage_config()?).await?;
    info!("💾 Storage initialized (using {})", cli.storage);
    let inference = create_model(&cli.inference_config()?).await?;

    match cli.command.clone().unwrap_or(Commands::Demo) {
        Commands::Report => {
            let manager = build_manager(&cli, inference, storage)?;
            manager.run_cycle(&cli.topic, cli.max_articles).await?;
        }
        Commands::Chat => chat(&cli, inference, storage).await?,
        Commands::Hourly { interval, max_cycles, queue_missed } => {
            let manager = build_manager(&cli, inference, storage)?;
            let policy = if queue_missed { OverlapPolicy::Queue } else { OverlapPolicy::Skip };
            let mut ticker = IntervalTicker::new(interval.0, policy)?;
            info!(
                "⏰ Running in periodic mode every {}s (missed cycles: {:?}). Press Ctrl+C to stop.",
                interval.0.as_secs(),
                policy
            );
            tokio::select! {
                completed = run_periodic(&mut ticker, max_cycles, || manager.run_cycle(&cli.topic, cli.max_articles)) => {
                    info!("⏰ Finished after {} cycles", completed);
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("⏰ Stopped periodic reporting");
                }
            }
        }
        Commands::Demo => {
            let manager = build_manager(&cli, inference.clone(), storage.clone())?;
            if let Err(e) = manager.run_cycle(&cli.topic, cli.max_articles).await {
                error!("Report generation failed: {}", e);
            }
            chat(&cli, inference, storage).await?;
        }
        Commands::List => {
            let reports = storage.list().await?;
            if reports.is_empty() {
                println!("No reports found.");
            }
            for report in reports {
                println!(
                    "{}  {}  ({} articles)",
                    report.generated_at.to_rfc3339(),
                    report.topic,
                    report.article_count
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration_units() {
        assert_eq!("1h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
        assert_eq!("30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(1800));
        assert_eq!("1d".parse::<HumanDuration>().unwrap().0, Duration::from_secs(86400));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
    }

    #[test]
    fn test_human_duration_errors() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
        assert!("1h-".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        assert_eq!(
            "99999999999999999h".parse::<HumanDuration>().unwrap_err(),
            "Duration is too large"
        );
        assert!("213503982334602d".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999999".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s1s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_feed_url_sources_in_order() {
        let flag = Some("https://example.com/flag.xml".to_string());
        let legacy = Some("https://example.com/legacy.xml".to_string());
        assert_eq!(resolve_feed_url(flag, legacy.clone()), "https://example.com/flag.xml");
        assert_eq!(resolve_feed_url(None, legacy), "https://example.com/legacy.xml");
        assert_eq!(resolve_feed_url(None, None), DEFAULT_FEED_URL);
        assert_eq!(resolve_feed_url(None, Some(String::new())), DEFAULT_FEED_URL);
    }

    #[test]
    fn test_default_mode_and_globals() {
        let cli = Cli::try_parse_from(["nr"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.max_articles, 5);

        let cli = Cli::try_parse_from(["nr", "report", "--topic", "Space", "--max-articles", "3"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Report)));
        assert_eq!(cli.topic, "Space");
        assert_eq!(cli.max_articles, 3);
    }

    #[test]
    fn test_hourly_arguments() {
        let cli = Cli::try_parse_from(["nr", "hourly", "--interval", "30m", "--max-cycles", "2"]).unwrap();
        match cli.command {
            Some(Commands::Hourly { interval, max_cycles, queue_missed }) => {
                assert_eq!(interval.0, Duration::from_secs(1800));
                assert_eq!(max_cycles, Some(2));
                assert!(!queue_missed);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_configs_from_flags() {
        let cli = Cli::try_parse_from([
            "nr", "--model", "dummy", "--storage", "memory", "--model-retries", "0", "chat",
        ])
        .unwrap();
        assert_eq!(cli.inference_config().unwrap().backend, ModelBackend::Dummy);
        assert_eq!(cli.inference_config().unwrap().max_retries, 0);
        assert_eq!(cli.storage_config().unwrap().kind, StorageKind::Memory);

        let cli = Cli::try_parse_from(["nr", "--model", "gpt", "chat"]).unwrap();
        assert!(cli.inference_config().is_err());
    }
}
