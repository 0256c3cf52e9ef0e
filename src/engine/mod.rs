//! Engine module: CLI parsing, command handling, progress display

pub mod arg_parser;
pub mod cli;
pub mod progress;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, setup_opts};
pub use progress::{ProgressBar, create_counter, refresh_bar, update_progress_bar};
