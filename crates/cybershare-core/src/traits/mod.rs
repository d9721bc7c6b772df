//! Core traits defined in `cybershare-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
