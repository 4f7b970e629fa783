pub mod task;
pub mod project;
pub mod config;
pub mod export;

pub use task::*;
pub use project::*;
pub use config::*;
pub use export::*;
