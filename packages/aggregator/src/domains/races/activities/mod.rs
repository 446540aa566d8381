pub mod prune;
pub mod publish;
pub mod sync;
