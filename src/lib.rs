pub mod channel;
pub mod hosts;
pub mod membership;
pub mod node;
pub mod rpc;
pub mod runtime;
pub mod server;
pub mod telemetry;

pub use tracing::{debug, error, info, warn};
