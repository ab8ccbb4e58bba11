//! API request and response types

pub mod error;
pub mod key_value;
pub mod params;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use key_value::{CreateParams, ModifyParams, ReadResponse};
pub use params::Params;
