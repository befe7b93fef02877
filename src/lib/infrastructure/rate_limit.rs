//! Rate limit stores

pub mod memory;
