pub mod condition;
pub mod drug;
pub mod guideline;

pub use condition::Condition;
pub use drug::DrugEntry;
pub use guideline::{GuidelineChunk, PatientGuideline};
