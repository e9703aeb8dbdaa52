pub mod client;
pub mod contracts;

pub use client::*;
