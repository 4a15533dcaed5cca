//! Domain model (identifiers, result record, errors).

pub mod errors;
pub mod ids;
pub mod result;

pub use self::errors::{ExecError, StatusError, StoreError, SubmitError, ValidationError};
pub use self::ids::{JobKey, RunId};
pub use self::result::{JobResult, JobStatus};
