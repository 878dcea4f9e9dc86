//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (--config, optional)
//!     → loader.rs (parse & deserialize, defaults fill the gaps)
//!     → cli.rs (flags applied on top)
//!     → validation.rs (semantic checks, all errors at once)
//!     → RelayConfig (immutable for the life of the process)
//! ```
//!
//! # Design Decisions
//! - Every field has a default; the relay runs with no file and no flags
//! - Config is immutable once validated; changes require a restart
//! - Any configuration error is fatal at startup

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::RelayConfig;
pub use validation::validate_config;
