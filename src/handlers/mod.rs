pub mod key_values;
pub mod login;
pub mod submit;
pub mod tabs;
