pub mod attachment;
pub mod error;
pub mod task;

pub use attachment::ImageKind;
pub use error::ValidationError;
pub use task::{CreateTask, ReplaceTask, Task};
