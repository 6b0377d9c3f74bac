// src/utils/mod.rs

pub mod answer;
pub mod hash;
pub mod jwt;
pub mod qr;
