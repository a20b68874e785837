//! Core functionality for videoparser

pub mod context;
pub mod parser;
pub mod video_info;

pub use context::*;
pub use parser::*;
pub use video_info::*;
