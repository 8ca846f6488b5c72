//! HTTP request handlers organized by functionality

pub mod catalog;
pub mod health;
pub mod research;
pub mod types;

pub use catalog::*;
pub use health::*;
pub use research::*;

pub use types::*;
