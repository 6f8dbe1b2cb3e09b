mod domain;
pub use domain::*;

mod report;
pub use report::*;

mod error;
pub use error::ModelError;
