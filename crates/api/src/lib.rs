//! API client error handling: transport failures in, one normalized error out.

pub mod error;
pub mod transport;

pub use error::{ApiError, ApiResult, GENERIC_MESSAGE, UNREACHABLE_MESSAGE, parse_api_error};
pub use transport::{ErrorResponse, TransportError, decode_error_body};
