//! Utility functions for videoparser

pub mod cache;
pub mod mime;
pub mod url;

pub use self::cache::*;
pub use self::mime::*;
pub use self::url::*;
