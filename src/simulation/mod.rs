//! Headless simulation - matches without rendering
//!
//! An auto-player takes the human's place so CPU profiles and tuning changes
//! can be measured over many matches.

pub mod app_builder;
pub mod autoplay;
pub mod config;
pub mod metrics;
pub mod parallel;
pub mod runner;

pub use app_builder::HeadlessAppBuilder;
pub use autoplay::{AutoPlayer, add_auto_player};
pub use config::{SimConfig, SimMode};
pub use metrics::{MatchResult, ProfileSummary, RallyStats, SweepResult};
pub use runner::{run_match, run_simulation};
