pub mod requests;

pub use requests::{
    CreateTabRequest, DeleteTabRequest, LoginRequest, RenameTabRequest, ReplaceKeyValuesRequest,
    SubmitRequest,
};
