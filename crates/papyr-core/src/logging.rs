//! Structured logging field names for papyr.
//!
//! Fields recorded after a span is created go through these constants so the
//! span declaration and the `record` call cannot drift apart.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed for a reason the operator must look at |
//! | WARN  | Recoverable issue, degraded response returned |
//! | INFO  | Lifecycle events, state transitions (upload, finalize, attach) |
//! | DEBUG | Decision points, intermediate values, config choices |

/// Correlation ID set by the request-id layer (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

pub const LABEL_ID: &str = "label_id";

/// Number of items returned.
pub const RESULT_COUNT: &str = "result_count";
