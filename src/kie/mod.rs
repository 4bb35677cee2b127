pub mod client;
pub mod error;
pub mod types;

pub use client::KieClient;
pub use error::KieError;
pub use types::{
    CallbackData, CallbackEnvelope, CreateTaskRequest, CreateTaskResponse, ResultPayload,
    UploadRequest, UploadResponse,
};
