mod config;
mod constants;
mod controller;
mod errors;
mod fetch;
mod metrics;
mod queue;
mod record;
mod reconciler;
mod source;
mod store;
pub mod utils;

pub use config::*;
pub use controller::*;
pub use errors::*;
pub use fetch::*;
pub use metrics::*;
pub use queue::*;
pub use record::*;
pub use reconciler::*;
pub use source::*;
pub use store::*;
