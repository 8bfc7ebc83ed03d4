pub mod change;
pub mod config_manager;
pub mod context;
pub mod error;
pub mod graph;
pub mod model;
pub mod traits;

pub use change::*;
pub use config_manager::*;
pub use context::*;
pub use error::*;
pub use graph::*;
pub use model::*;
pub use traits::*;
