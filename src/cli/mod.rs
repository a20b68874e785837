//! Command line interface for videoparser

pub mod args;

pub use args::*;
