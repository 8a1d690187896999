mod http;
mod local;
pub mod mirror;
mod traits;

pub use http::HttpService;
pub use local::LocalService;
pub use mirror::TaskMirror;
pub use traits::{ImageUpload, ServiceError, TaskService};
