pub mod account;
pub mod market;
pub mod simulation;
pub mod transaction;

pub use account::*;
pub use market::*;
pub use simulation::*;
pub use transaction::*;
