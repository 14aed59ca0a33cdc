// src/exam/mod.rs

pub mod aggregate;
pub mod normalize;
pub mod scoring;
pub mod session;
