pub mod section_flow;

pub use section_flow::{limit_for_debug, SectionFlow, SectionResult, SectionStages};
