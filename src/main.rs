use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use termfolio::app::App;
use termfolio::app::ui::Ui;
use termfolio::config::{Config, DurationOpt, PathOpt, USizeOpt};
use termfolio::feed::Feed;
use termfolio::fs::Fs;
use termfolio::log::Log;
use termfolio::net::Net;
use termfolio::terminal::Terminal;
use termfolio::utils::install_panic_hook;

use termfolio::ArcPath;

#[derive(Parser)]
#[command(name = "termfolio")]
#[command(about = "A terminal landing page with a typing intro and a live project list")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Feed endpoint URL, overriding the configured one for this run
    #[arg(short, long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_panic_hook();

    let cli = Cli::parse();

    // Initialize actors
    let fs = Fs::spawn();

    let config_path = match cli.config {
        Some(path) => path,
        None => dirs::config_dir()
            .context("Locating the user configuration directory")?
            .join("termfolio")
            .join("config.toml"),
    };
    let config_path = ArcPath::from(config_path.as_path());

    let config = Config::spawn(fs.clone(), config_path);
    if config.load().await.is_err() {
        config.save().await?;
    }
    if let Some(url) = cli.url {
        config.set_feed_url(url).await;
    }

    let log = Log::spawn(
        fs.clone(),
        config.log_level().await,
        config.usize(USizeOpt::MaxLogAge).await,
        config.path(PathOpt::LogDir).await,
    )
    .await?;

    let net = Net::spawn(log.clone());
    let feed = Feed::spawn(
        net,
        log.clone(),
        config.feed_url().await,
        config.duration(DurationOpt::CacheTtl).await,
    );

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(termfolio::BUFFER_SIZE);
    let terminal = Terminal::spawn(log.clone(), events_tx);
    let ui = Ui::spawn(log.clone(), terminal.clone());

    log.info("main", "starting termfolio");

    let app = App::new(
        log.clone(),
        ui,
        feed,
        terminal,
        events_rx,
        config.duration(DurationOpt::TypingInterval).await,
        config.duration(DurationOpt::Debounce).await,
    );
    let result = app.run().await;

    // The terminal is restored by now, so buffered messages can go to stderr.
    log.flush().await;

    result
}
