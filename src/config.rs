/// Application configuration, from command line flags
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::library::Library;
use crate::state::notice::NOTICE_DURATION;
use crate::state::viewer::{STORY_DURATION_MS, TICK_MS};

#[derive(Debug, Clone, Parser)]
#[command(name = "story-reel", version, about = "Photo stories that disappear after 24 hours")]
pub struct Args {
    /// SQLite file holding the stories (defaults to the user data directory)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// How long each story stays on screen
    #[arg(long, default_value_t = STORY_DURATION_MS)]
    pub story_duration_ms: u32,

    /// Playback progress step
    #[arg(long, default_value_t = TICK_MS)]
    pub tick_ms: u32,

    /// How often expired stories are swept from storage
    #[arg(long, default_value_t = 60)]
    pub sweep_interval_secs: u64,

    /// How long upload errors stay visible
    #[arg(long, default_value_t = NOTICE_DURATION.as_millis() as u64)]
    pub notice_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub story_duration_ms: u32,
    pub tick_ms: u32,
    pub sweep_interval: Duration,
    pub notice_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: Library::default_path(),
            story_duration_ms: STORY_DURATION_MS,
            tick_ms: TICK_MS,
            sweep_interval: Duration::from_secs(60),
            notice_duration: NOTICE_DURATION,
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        Self {
            db_path: args.db.unwrap_or_else(Library::default_path),
            story_duration_ms: args.story_duration_ms.max(1),
            tick_ms: args.tick_ms.max(1),
            sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
            notice_duration: Duration::from_millis(args.notice_ms),
        }
    }
}
