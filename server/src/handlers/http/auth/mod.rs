pub mod token;

pub use token::handle_token;
