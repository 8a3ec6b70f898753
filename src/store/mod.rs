//! SQL for the two tables. Every function is a single statement on the pool;
//! callers decide what a failure means.

pub mod attendance;
pub mod user;
