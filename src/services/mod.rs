// src/services/mod.rs

pub mod attempts;
pub mod catalog;
pub mod enrollment;
pub mod notifier;
pub mod progress;
pub mod rating;
pub mod scoring;
