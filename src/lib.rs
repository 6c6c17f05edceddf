// 三层架构模块
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

// 重新导出主要类型
pub use domain::{MatchRecord, RecognizedExtensions, WalkSignal};
pub use application::{Config, Locator, SearchOptions, SearchOutcome, SearchPlan};
pub use infrastructure::{ErrorLogger, ErrorType, Logger, LoggerTrait};
pub use presentation::{print_match_record, ConsoleReporter};
