pub mod output;

pub use output::{display_answer, display_queries, display_verdict};
