pub mod monitor;
pub mod window;

pub use monitor::Monitor;
pub use window::{Window, WindowId, WindowRef};
