pub mod save_indicator;

pub use save_indicator::{SaveIndicator, SaveNotifier};
