use clap::{Args, Parser, Subcommand};
use common::{Config, SubtitleFormat, SubtitleProvider};
use dotenv::dotenv;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use provider_opensubtitles::OpenSubtitlesProvider;

mod commands;

/// 从 opensubtitles.org 搜索并下载字幕
#[derive(Parser, Debug)]
#[command(name = "subgrab", version, about = "Search and download subtitles", long_about = None)]
pub struct Cli {
    /// Maximum number of search results
    #[arg(long, global = true)]
    max_results: Option<usize>,

    /// Preferred subtitle format when unpacking archives
    #[arg(long, global = true)]
    format: Option<SubtitleFormat>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search subtitles for an episode or a media file
    Search(SearchArgs),
    /// Download a subtitle by id
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Series name
    #[arg(long)]
    series: Option<String>,

    /// Season number
    #[arg(long, requires = "series")]
    season: Option<u32>,

    /// Episode number
    #[arg(long, requires = "series")]
    episode: Option<u32>,

    /// Media file, used to derive the title when no series is given
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Subtitle language (two or three letter code)
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Subtitle id returned by `search`
    id: String,

    /// Output file, `-` for stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn init_providers(config: &Config) -> anyhow::Result<Vec<Box<dyn SubtitleProvider>>> {
    Ok(vec![Box::new(OpenSubtitlesProvider::from_config(config)?)])
}

/// 命令行参数覆盖环境变量中的配置
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_results) = cli.max_results {
        config.max_search_results = max_results;
    }
    if let Some(format) = cli.format {
        config.preferred_format = format.extension().to_string();
    }
    if cli.debug {
        config.enable_debug_logging = true;
    }
}

fn init_logger(config: &Config) {
    let default_filter = if config.enable_debug_logging {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Ctrl-C 时取消所有进行中的请求
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Received Ctrl-C, cancelling pending requests");
            cancel.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    apply_overrides(&mut config, &cli);
    init_logger(&config);
    log::debug!("Using config: {:?}", config);

    let providers = init_providers(&config)?;
    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match &cli.command {
        Command::Search(args) => commands::search(&providers, args, &config, &cancel).await,
        Command::Get(args) => commands::get(&providers, args, &config, &cancel).await,
    }
}
