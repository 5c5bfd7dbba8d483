//! End-to-end run of one topic: validation, title, slides, sequencing, translation, publishing.
//!
//! Stages run one after another on the calling thread. Runs for different topics may proceed
//! in parallel; runs for the same topic are serialized by [`orchestrator::TopicLocks`].

/// The run driver.
pub mod orchestrator;
/// Per-run aggregate and report.
pub mod run;
/// Run states, stages and errors.
pub mod state;
/// Scoped working directory.
pub mod workdir;
