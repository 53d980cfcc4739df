pub mod todo;
pub mod theme;
pub mod config;

pub use todo::*;
pub use theme::*;
pub use config::*;
