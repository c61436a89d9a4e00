#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod model;
pub mod time;

pub use error::Error;
pub use generator::{ScriptedSource, SeededSource, SequenceGenerator, SymbolSource};
pub use time::Clock;
