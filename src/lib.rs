pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod resources;
pub mod storage;
pub mod tools;
pub mod types;

pub use config::Config;
pub use engine::CrossAgentInvoker;
pub use error::{Error, Result};
pub use types::*;
