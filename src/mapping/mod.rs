pub mod generator;
pub mod result;
pub mod summary;
