// src/core/mod.rs

pub mod aggregator;
pub mod flattener;
pub mod interpolator;
pub mod line_classifier;
pub mod parser;
pub mod paths;
pub mod processing_tree;
pub mod settings;
pub mod walker;
