//! Bounded prefetch pipeline: producer, loader workers, ordered drain.
//!
//! Two queues of capacity C carry every item: the *work queue* feeds the
//! workers (completion order irrelevant), the *order queue* fixes delivery
//! order at production time. The split is the crux of the correctness
//! argument: checkpoint commits must advance in traversal order, so the
//! drain waits on each item's completion channel in FIFO order no matter
//! which worker finishes first.

pub mod context;
pub mod drain;
pub mod orchestrator;
pub mod producer;
pub mod worker;

pub use drain::Trawl;
pub use orchestrator::run_pipeline;
