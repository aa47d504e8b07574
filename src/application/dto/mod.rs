//! Data Transfer Objects

pub mod request;
pub mod response;
