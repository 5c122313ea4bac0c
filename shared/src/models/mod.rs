pub mod character;
pub mod request;

pub use character::*;
pub use request::*;
