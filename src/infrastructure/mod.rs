pub mod logging;
pub mod error_logging;

pub use logging::{Logger, LoggerTrait};
pub use error_logging::{ErrorLogger, ErrorType, LoggedFileSystem};
