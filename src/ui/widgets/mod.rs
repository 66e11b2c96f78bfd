//! Reusable widgets

pub mod footer;
