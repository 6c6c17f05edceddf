pub mod config;
pub mod locator;
pub mod search_plan;

pub use config::{Config, ConfigError, DisplayConfig, SearchConfig};
pub use locator::{Locator, MatchReporter, SearchOptions, SearchOutcome};
pub use search_plan::SearchPlan;
