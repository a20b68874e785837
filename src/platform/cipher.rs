//! Signature transform program and its interpreter

use crate::error::ExtractionError;
use std::fmt;
use tracing::warn;

/// One step of a signature scrambling program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Reverse the whole sequence
    Reverse,
    /// Exchange index 0 with the given index
    Swap(usize),
    /// Drop the first n elements, keeping the rest
    Slice(usize),
    /// Remove the first n elements in place
    Splice(usize),
}

impl Transform {
    /// Short token used when logging programs
    pub fn token(&self) -> String {
        match self {
            Transform::Reverse => "r".to_string(),
            Transform::Swap(pos) => format!("w{pos}"),
            Transform::Slice(pos) => format!("s{pos}"),
            Transform::Splice(pos) => format!("p{pos}"),
        }
    }

    fn run(&self, chars: &mut Vec<char>) {
        match *self {
            Transform::Reverse => chars.reverse(),
            Transform::Swap(pos) => {
                if pos < chars.len() {
                    chars.swap(0, pos);
                } else {
                    warn!("swap position {} out of range for length {}", pos, chars.len());
                }
            }
            Transform::Slice(pos) | Transform::Splice(pos) => {
                if pos > chars.len() {
                    warn!("{} out of range for length {}", self.token(), chars.len());
                }
                chars.drain(..pos.min(chars.len()));
            }
        }
    }
}

/// Ordered, non-empty list of transforms derived from one player script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherProgram {
    ops: Vec<Transform>,
}

impl CipherProgram {
    /// Create a new program; an empty list is rejected
    pub fn new(ops: Vec<Transform>) -> Result<Self, ExtractionError> {
        if ops.is_empty() {
            return Err(ExtractionError::NoOperations);
        }
        Ok(Self { ops })
    }

    pub fn operations(&self) -> &[Transform] {
        &self.ops
    }

    /// Replay the program over `signature`
    pub fn apply(&self, signature: &str) -> String {
        let mut chars: Vec<char> = signature.chars().collect();
        for op in &self.ops {
            op.run(&mut chars);
        }
        chars.into_iter().collect()
    }
}

impl fmt::Display for CipherProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.ops.iter().map(Transform::token).collect();
        write!(f, "{}", tokens.join(" "))
    }
}
