// src/models/mod.rs

pub mod actor;
pub mod attempt;
pub mod enrollment;
pub mod notification;
pub mod progress;
pub mod quiz;
pub mod rating;
pub mod user;
