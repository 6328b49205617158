//! KeyedStore Integration Tests
//!
//! Exercises the store end to end over the in-process backend, observing
//! backend traffic through a recording wrapper.
//!
//! ```bash
//! cargo test --test store
//! cargo test --test store set_ops::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod mutations;
mod set_ops;
