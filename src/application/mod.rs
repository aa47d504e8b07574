//! Application Layer

pub mod dto;
pub mod services;
