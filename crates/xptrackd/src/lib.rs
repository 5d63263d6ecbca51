//! XP Track daemon library.
//!
//! Exposed as a library so integration tests can drive the router and the
//! collector without spawning the binary.

pub mod collector;
pub mod highscores;
pub mod routes;
pub mod server;
