//! Request and response types used by the handlers

pub mod catalog;
pub mod common;
pub mod research;

pub use catalog::*;
pub use common::*;
pub use research::*;
