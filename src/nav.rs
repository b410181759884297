//! Navigation core
//!
//! Query codec, session guard, content fetcher and navigation router.

pub use portico_nav::*;
