pub mod dispatch;
pub mod pipeline;
