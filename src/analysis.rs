pub mod correlation;
pub mod fdr;
pub mod output;
pub mod pipeline;
pub mod plot;
pub mod preprocess;
pub mod stats;
