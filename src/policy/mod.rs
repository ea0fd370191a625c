pub mod levels;
pub mod parser;
pub mod types;

pub use levels::OversightLevel;
pub use types::*;
