pub mod auth;
pub mod json_body;

pub use auth::RequireToken;
pub use json_body::JsonBody;
