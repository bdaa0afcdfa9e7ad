//! Feed implementations.

pub mod memory_feed;
