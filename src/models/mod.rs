// src/models/mod.rs

pub mod guest;
pub mod leaderboard;
pub mod question;
pub mod response;
