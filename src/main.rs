mod config;
mod constants;
mod controller;
mod error;
mod notifier;
mod payload;
mod quota;
mod sanitize;
mod state;
mod stats;
mod store;
mod traits;
mod transport;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::config::{Config, ConfigSources};
use crate::constants::{COME_BACK_TOMORROW_TEXT, MESSAGE_SENT_TEXT};
use crate::controller::{AttemptOutcome, SubmissionController};
use crate::error::AppError;
use crate::notifier::ConsoleNotifier;
use crate::quota::QuotaTracker;
use crate::state::AttemptPhase;
use crate::store::{MemoryQuotaStore, SqliteQuotaStore};
use crate::traits::{Clock, QuotaStore, SystemClock};
use crate::transport::HttpTransport;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "anon-note", about = "Send an anonymous note, a few per day")]
struct Args {
    /// Collection endpoint that receives the notes
    #[arg(long, env = "ANON_NOTE_API_URL")]
    api_url: Option<String>,

    /// Static bearer token sent with every note
    #[arg(long, env = "ANON_NOTE_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,

    /// Maximum notes this device may send per calendar day
    #[arg(long, env = "ANON_NOTE_MAX_MESSAGES_PER_DAY")]
    max_messages_per_day: Option<String>,

    /// YAML file with api_url, bearer_token, max_messages_per_day, db_path
    #[arg(long, env = "ANON_NOTE_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite file holding the daily quota
    #[arg(long, env = "ANON_NOTE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "ANON_NOTE_LOG_FORMAT")]
    log_format: LogFormat,

    /// Print today's quota usage as JSON and exit
    #[arg(long)]
    status: bool,

    /// Note to send; without it, each stdin line is one attempt
    message: Option<String>,
}

impl Args {
    fn sources(&self) -> ConfigSources {
        ConfigSources {
            api_url: self.api_url.clone(),
            bearer_token: self.bearer_token.clone(),
            max_messages_per_day: self.max_messages_per_day.clone(),
            db_path: self.db_path.clone(),
            config_path: self.config.clone(),
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("anon_note=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Open the on-disk quota store, or fall back to memory so a broken
/// database never blocks sending.
fn open_store(path: &Path) -> Box<dyn QuotaStore> {
    match SqliteQuotaStore::open(path) {
        Ok(store) => {
            info!(path = %path.display(), "Quota database opened");
            Box::new(store)
        }
        Err(e) => {
            warn!(path = %path.display(), "Quota database unavailable, using in-memory quota: {e}");
            Box::new(MemoryQuotaStore::default())
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = match Config::resolve(args.sources()) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tracker = QuotaTracker::new(open_store(&config.db_path), clock.clone(), config.max_messages_per_day);

    if args.status {
        println!("{}", stats::build_status_json(&tracker));
        return;
    }

    info!(api = %config.api_url, limit = config.max_messages_per_day, "anon-note starting");

    let controller = SubmissionController::new(
        tracker,
        Box::new(HttpTransport::new(config.api_url, config.bearer_token)),
        Box::new(ConsoleNotifier::stdout()),
        clock,
        Box::new(|| println!("{MESSAGE_SENT_TEXT}")),
    );

    let result = match args.message {
        Some(message) => send_once(&controller, &message).await,
        None => interactive(&controller).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

/// One attempt from the command line. Returns whether the note went out.
async fn send_once(controller: &SubmissionController, message: &str) -> Result<bool, AppError> {
    if controller.mount() {
        println!("{COME_BACK_TOMORROW_TEXT}");
        return Ok(false);
    }
    controller.focus();
    controller.input(message);

    match controller.submit().await {
        AttemptOutcome::Delivered { sent_today } => {
            info!(sent_today, limit = controller.tracker().max_per_day(), "Note delivered");
            return Ok(true);
        }
        AttemptOutcome::Blocked { alerted } => {
            info!(alerted, "Daily limit already reached");
        }
        AttemptOutcome::Rejected(reason) => {
            info!(%reason, "Note rejected");
        }
        AttemptOutcome::Failed | AttemptOutcome::Busy => {}
    }
    if controller.view().rate_limit_reached {
        println!("{COME_BACK_TOMORROW_TEXT}");
    }
    Ok(false)
}

/// Read attempts from stdin until one is delivered, the cap is hit, or
/// input ends.
async fn interactive(controller: &SubmissionController) -> Result<bool, AppError> {
    if controller.mount() {
        println!("{COME_BACK_TOMORROW_TEXT}");
        return Ok(false);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} > ", controller.view().visible_placeholder());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(false);
        };

        // Typing focuses the input; Enter submits if the button would allow it.
        controller.focus();
        controller.input(&line);
        if controller.view().can_submit() {
            controller.submit().await;
        }

        let view = controller.view();
        if view.last_outcome == Some(AttemptPhase::Delivered) {
            return Ok(true);
        }
        if view.rate_limit_reached {
            println!("{COME_BACK_TOMORROW_TEXT}");
            return Ok(false);
        }
        controller.blur();
    }
}
