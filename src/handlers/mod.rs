// src/handlers/mod.rs

pub mod attempt;
pub mod auth;
pub mod enrollment;
pub mod notification;
pub mod progress;
pub mod quiz;
pub mod rating;
