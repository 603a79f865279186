pub mod diagnostic;

pub use diagnostic::*;
