// clipscreen-cli/src/lib.rs
//
// Library portion of the clipscreen CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod interrupt;
pub mod logging;
pub mod output;
pub mod progress;
pub mod source;

// Re-export items needed by the binary or integration tests
pub use cli::{ClipArgs, Cli, Commands, ProcessArgs, SourceArgs, VocabularyArgs};
pub use commands::health::run_health;
pub use commands::run::{run_batch, run_clip};
pub use commands::vocabulary::run_vocabulary;
pub use source::ClipSource;
