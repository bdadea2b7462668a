pub mod enricher;
pub mod patch;
