pub mod deliver_page;
pub mod headers;
pub mod json_response;
pub mod request;

// Re-export commonly used utilities
pub use deliver_page::*;
pub use headers::*;
pub use json_response::*;
pub use request::*;
