mod error;
pub use error::ClientError;

mod client;
pub use client::{StatusReport, TaskClient};
