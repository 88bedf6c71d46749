// Common helpers for handlers

pub mod utils;
