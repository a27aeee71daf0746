#![doc = include_str!("../README.md")]

pub mod config;
pub mod cpu;
pub mod embodied;
pub mod error;
pub mod model;
pub mod power_model;
pub mod record;
pub mod registry;
pub mod vendor;
