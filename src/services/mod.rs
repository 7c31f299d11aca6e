// src/services/mod.rs
pub mod axis;
pub mod binning;
pub mod chart;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod returns;
pub mod statistics;
