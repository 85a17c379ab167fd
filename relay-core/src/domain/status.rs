//! Job status vocabulary
//!
//! Upstream workflows report free-form status strings. Only two questions
//! matter to the relay: should polling continue, and did the job fail.

/// Status assumed for a job that has an id but no reported status yet
pub const PROCESSING: &str = "processing";

/// Status reported once the workflow engine marks an execution finished
pub const COMPLETED: &str = "completed";

/// Status reported for a workflow-level failure
pub const ERROR: &str = "error";

/// Statuses that mean the job is still running upstream
pub const IN_FLIGHT: [&str; 5] = ["processing", "pending", "queued", "running", "in_progress"];

/// Terminal statuses that mean the job failed
pub const ERROR_STATUSES: [&str; 3] = ["error", "failed", "failure"];

/// Returns true while polling should continue
pub fn is_in_flight(status: &str) -> bool {
    IN_FLIGHT.contains(&status)
}

/// Returns true for any status outside the in-flight set
pub fn is_terminal(status: &str) -> bool {
    !is_in_flight(status)
}

/// Returns true for terminal statuses that report a failure
pub fn is_error(status: &str) -> bool {
    ERROR_STATUSES.contains(&status)
}
