mod client;
mod config;
mod coordinator;
mod diagnostics;
mod error;
mod logger;
mod protocol;
mod types;
mod xml;

pub use config::Config;
pub use coordinator::{
    Coordinator, CoordinatorBuilder, ListenerId, Update, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_UPDATE_INTERVAL,
};
pub use diagnostics::{Diagnostics, SystemDiagnostics, ZoneDiagnostics};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use types::*;
