pub mod scatter;
pub mod summary;
