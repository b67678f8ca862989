pub mod posts;

pub use posts::{PostsService, ResourcePath, handle_posts};
