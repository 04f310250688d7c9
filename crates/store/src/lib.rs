#![forbid(unsafe_code)]

//! Client-side state that outlives individual screens: the auth token and
//! the session-to-test cross-reference needed by the feedback step.
//!
//! Both live behind the [`ClientStore`] trait so components receive an
//! explicit store with an explicit lifecycle (token set at login, cleared at
//! logout; cross-reference set at session start, cleared after feedback)
//! instead of reaching for ambient global state.

pub mod json_file;
pub mod store;

pub use json_file::JsonFileStore;
pub use store::{ClientStore, InMemoryStore, StoreError};
