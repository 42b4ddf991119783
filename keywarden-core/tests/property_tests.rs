//! Property-based tests for `Keywarden` core library
//!
//! Properties cover the saved-credential vault and the database adapter.

#![allow(clippy::redundant_clone)]

mod properties;
