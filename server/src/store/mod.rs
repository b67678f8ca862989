pub mod posts;

pub use posts::PostStore;
