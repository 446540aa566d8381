pub mod race;
pub mod raw;

pub use race::*;
pub use raw::*;
