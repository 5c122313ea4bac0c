pub mod heroes;

pub use heroes::*;
