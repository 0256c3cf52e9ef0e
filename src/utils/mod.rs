pub mod config;
pub mod logger;
pub mod subgrab_toml;

pub use config::*;
pub use logger::{Colors, setup_logging};
pub use subgrab_toml::{SubgrabToml, apply_file_to_opts, load_subgrab_toml};
