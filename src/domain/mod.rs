pub mod filesystem;
pub mod matcher;
pub mod results;
pub mod walker;

pub use filesystem::{ChildEntry, EntryMeta, FileSystem, OsFileSystem};
pub use matcher::{RecognizedExtensions, DEFAULT_EXTENSIONS};
pub use results::MatchRecord;
pub use walker::{walk, WalkSignal};
