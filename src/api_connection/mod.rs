pub mod connection;
pub mod endpoints;

pub use connection::{strip_code_fence, ApiConnectionError};
pub use endpoints::Provider;
