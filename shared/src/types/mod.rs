pub mod claims;
pub mod json_error;
pub mod post;
pub mod role;
pub mod server_config;

pub use self::claims::{Claims, Redacted, TokenPayload, TokenUser};
pub use self::json_error::ErrorResponse;
pub use self::post::{Post, PostInput};
pub use self::role::{Role, RoleSet, UnknownRole};
