//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RewriterConfig (validated, immutable)
//!     → build_rewriter() → Arc<Rewriter> shared by all requests
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the rule set
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Only the rule set is hot-swappable; listener and origin need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, OriginConfig, RewriterConfig, RuleConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
