pub mod evaluator;
pub mod selector;
