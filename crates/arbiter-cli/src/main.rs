use arbiter_core::config::{self, Settings};
use arbiter_core::engine::runner::Runner;
use arbiter_core::evaluator::LlmEvaluator;
use arbiter_core::providers::judge::{fake::FakeJudge, openai::OpenAiJudge, JudgeClient};
use arbiter_core::source::DirectorySource;
use arbiter_core::storage::Store;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "arbiter",
    version,
    about = "Batch audit pipeline for LLM agent transcripts"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Perform one ingestion-and-evaluation pass over unprocessed transcripts
    Run(RunArgs),
    /// List recent log entries with their check outcomes
    Logs(LogsArgs),
    /// Write a sample arbiter.yaml
    Init(InitArgs),
    Version,
}

#[derive(Parser, Clone)]
struct RunArgs {
    #[arg(long, default_value = "arbiter.yaml")]
    config: PathBuf,

    /// judge provider: openai|fake
    #[arg(long, default_value = "openai", env = "ARBITER_JUDGE")]
    judge: String,

    #[arg(long, env = "ARBITER_JUDGE_MODEL")]
    judge_model: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// override logs_dir from the config file
    #[arg(long)]
    logs_dir: Option<PathBuf>,

    /// override database_url from the config file
    #[arg(long)]
    db: Option<PathBuf>,

    #[arg(long)]
    debug: bool,
}

#[derive(Parser, Clone)]
struct LogsArgs {
    #[arg(long, default_value = "arbiter.yaml")]
    config: PathBuf,

    #[arg(long)]
    db: Option<PathBuf>,

    #[arg(long, default_value_t = 20)]
    limit: u32,

    #[arg(long)]
    debug: bool,
}

#[derive(Parser, Clone)]
struct InitArgs {
    #[arg(long, default_value = "arbiter.yaml")]
    config: PathBuf,
}

mod exit_codes {
    pub const OK: i32 = 0;
    pub const PASS_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => cmd_run(args).await,
        Command::Logs(args) => cmd_logs(args).await,
        Command::Init(args) => cmd_init(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn load_settings(config: &PathBuf, debug: bool) -> anyhow::Result<Settings> {
    let mut settings = if config.exists() {
        config::load_config(config)?
    } else {
        Settings::default()
    };
    settings.debug = settings.debug || debug;
    Ok(settings)
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let mut settings = load_settings(&args.config, args.debug)?;
    if let Some(dir) = args.logs_dir {
        settings.logs_dir = dir;
    }
    if let Some(db) = args.db {
        settings.database_url = db;
    }
    if let Some(model) = args.judge_model {
        settings.judge_model = model;
    }
    init_logging(settings.debug);

    let source = DirectorySource::new(
        &settings.logs_dir,
        &settings.file_glob,
        &settings.processed_prefix,
    )?;
    let store = Store::open(&settings.database_url)?;

    let client: Arc<dyn JudgeClient> = match args.judge.as_str() {
        "openai" => {
            let api_key = args.openai_api_key.ok_or_else(|| {
                anyhow::anyhow!("config error: --judge openai requires OPENAI_API_KEY")
            })?;
            Arc::new(OpenAiJudge::new(settings.judge_model.clone(), api_key))
        }
        "fake" => Arc::new(FakeJudge),
        other => anyhow::bail!(
            "config error: unknown judge provider {:?} (expected openai|fake)",
            other
        ),
    };

    let runner = Runner {
        source,
        store,
        evaluator: Arc::new(LlmEvaluator::new(client)),
        judge_timeout: Duration::from_secs(settings.judge_timeout_seconds),
    };

    let summary = runner.run_once().await?;
    arbiter_core::report::console::print_summary(&summary);

    Ok(if summary.skipped.is_empty() {
        exit_codes::OK
    } else {
        exit_codes::PASS_FAILED
    })
}

async fn cmd_logs(args: LogsArgs) -> anyhow::Result<i32> {
    let mut settings = load_settings(&args.config, args.debug)?;
    if let Some(db) = args.db {
        settings.database_url = db;
    }
    init_logging(settings.debug);

    let store = Store::open(&settings.database_url)?;
    store.ensure_schema()?;

    for log in store.recent_logs(args.limit)? {
        println!(
            "#{} {} agent={} model={} checks={}",
            log.id,
            log.filepath,
            log.agent_name.as_deref().unwrap_or("-"),
            log.model.as_deref().unwrap_or("-"),
            log.check_count
        );
        for check in store.checks_for_log(log.id)? {
            println!(
                "    {:<20} {:?}  {}",
                check.check_name.as_str(),
                check.outcome,
                check.details.as_deref().unwrap_or("")
            );
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        eprintln!("note: {} already exists (skipped)", args.config.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = args.config.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    config::write_sample_config(&args.config)?;
    eprintln!("created {}", args.config.display());
    Ok(exit_codes::OK)
}
