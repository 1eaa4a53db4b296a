pub mod correlation;
pub mod health;
pub mod prediction;
pub mod training;

pub use correlation::*;
pub use health::*;
pub use prediction::*;
pub use training::*;
