pub mod races;
pub mod sources;
