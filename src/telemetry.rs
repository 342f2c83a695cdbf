//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `specdrafter_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `kind`: chunk kind ("thought", "text", "phase_complete") or stream
//!   kind ("chat", "document")
//! - `reason`: why a frame was dropped: "malformed" (bad JSON, or a known
//!   `type` with wrongly shaped fields) or "unrecognized" (missing or
//!   unknown `type`)
//! - `status`: outcome: "ok" or "error"
//! - `operation`: client call (e.g. "get_project", "chat")

/// Total event frames dropped by the chat decoder.
///
/// Labels: `reason` ("malformed" | "unrecognized"). A frame with a known
/// `type` but wrongly shaped fields counts as "malformed".
pub const FRAMES_DROPPED_TOTAL: &str = "specdrafter_frames_dropped_total";

/// Total chunks decoded from chat streams.
///
/// Labels: `kind` ("thought" | "text" | "phase_complete").
pub const CHUNKS_TOTAL: &str = "specdrafter_chunks_total";

/// Total streams consumed to the end or to a failure.
///
/// Labels: `kind` ("chat" | "document"), `status` ("ok" | "error").
pub const STREAMS_TOTAL: &str = "specdrafter_streams_total";

/// HTTP request duration in seconds, up to response headers.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "specdrafter_request_duration_seconds";
