// src/cli/handlers/mod.rs

pub mod check;
pub mod commons;
pub mod dump;
pub mod script;
