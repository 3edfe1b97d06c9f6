mod board;
mod category;

pub use board::{ResetRequest, TimerBoard, TimerRuntimeState, TimerStatus};
pub use category::Category;
