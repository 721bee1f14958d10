//! HTTP handlers

pub mod health;
pub mod predict;
pub mod monitor;
pub mod dashboard;
