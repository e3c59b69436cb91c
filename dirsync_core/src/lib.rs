pub mod collector;
pub mod eraser;
pub mod reconciler;
pub mod synchronizer;

pub use collector::{PathCollector, Scan};
pub use eraser::{erase_contents, Erasure};
pub use reconciler::{reconcile, Reconciliation};
pub use synchronizer::Synchronizer;
