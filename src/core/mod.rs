//! Version extraction and the batch machinery around it

pub mod extractor;
pub mod plan;
pub mod processor;
pub mod walker;

pub use extractor::extract;
pub use plan::RunPlan;
pub use processor::Processor;
pub use walker::FileWalker;
