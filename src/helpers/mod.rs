//! Helper functions shared by the content loader and the templates

mod date;

pub use date::*;
