pub mod error;
pub mod logging;
pub mod network;

pub use error::{CheckError, Result};
pub use logging::{setup_logging, LogFormat, LoggingConfig};
pub use network::{build_client, NetworkConfig};
