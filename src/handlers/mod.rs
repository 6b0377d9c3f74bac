// src/handlers/mod.rs

pub mod admin;
pub mod game;
pub mod guest;
