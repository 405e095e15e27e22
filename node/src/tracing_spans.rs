//! Span constructors shared by the node's block lifecycle and manager jobs,
//! so traces can be filtered by phase and height.

use tracing::{info_span, Span};

/// One phase (`begin_block`, `deliver_tx`, `end_block`, `commit`) of the
/// block at `height`.
pub fn block_span(phase: &'static str, height: u64) -> Span {
    info_span!("block", phase, height)
}

/// An out-of-band manager job over a height range.
pub fn manager_span(job: &'static str, from: u64, to: u64) -> Span {
    info_span!("manager", job, from, to)
}
