//! URL dispatch and application launching for the openwith service.
//!
//! A request URL is matched against ordered [`PatternRule`]s, its query is
//! rewritten, and the configured application is started with the resulting
//! arguments. When running as a background service the application is
//! started in the interactive user's session via
//! [`launcher::session::CrossSessionLauncher`]; otherwise it runs as a child
//! of this process.

pub mod config;
pub mod dispatch;
pub mod dispatcher;
pub mod error;
pub mod launcher;
pub mod resolve;
pub mod watch;

pub use config::{Config, ConfigHandle};
pub use dispatch::{Dispatch, PatternRule};
pub use dispatcher::{Dispatcher, Resolution};
pub use error::{ConfigError, LaunchError, LaunchStage};
pub use launcher::{LaunchMode, LaunchReport, Launcher};
pub use resolve::ResolvedCommand;
