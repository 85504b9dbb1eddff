//! External process execution

pub mod run;

pub use run::{run_process, ProcessFailure, ProcessOutput};
