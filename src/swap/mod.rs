pub mod orchestrator;
pub mod reconciler;

pub use orchestrator::SwapOrchestrator;
pub use reconciler::StatusReconciler;
