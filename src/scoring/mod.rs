pub mod cultural;
pub mod evaluator;

pub use evaluator::{Evaluation, Evaluator, QualityIssue};
