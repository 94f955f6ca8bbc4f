//! Request extractors and response types shared by the route handlers.

pub mod extract;
pub mod response;

pub use extract::ApiJson;
pub use response::MessageResponse;
