pub mod display;

pub use display::{format_locations, print_match_record, write_match_record, ConsoleReporter};
