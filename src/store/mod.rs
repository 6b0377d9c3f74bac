// src/store/mod.rs

//! SQLite persistence. Functions that issue a single statement take any
//! executor; multi-statement operations take a connection so they can run
//! inside a caller's transaction.

pub mod guests;
pub mod leaderboard;
pub mod questions;
pub mod responses;
pub mod seed;
pub mod submission;
