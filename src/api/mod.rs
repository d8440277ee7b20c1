pub mod cors;
pub mod event;
pub mod format;
pub mod response;

pub use cors::Cors;
pub use event::{Event, FunctionResponse};
pub use response::{ApiResponse, ApiResult};
