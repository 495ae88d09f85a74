//! Grammars bundled with the front-end.

pub mod calc;

pub use calc::Calc;
