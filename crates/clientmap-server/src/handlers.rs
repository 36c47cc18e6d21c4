//! HTTP handlers

pub mod auth;
pub mod geocode;
pub mod map;
pub mod records;
