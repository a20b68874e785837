//! Cipher program extraction from obfuscated player scripts
//!
//! The player script defines an object literal with four one-line members
//! (reverse, slice, splice, swap) and a driver function that splits the
//! signature, calls those members in order, and joins it back. Member names
//! change with every player release, so members are identified by the shape
//! of their bodies and never by name.

use crate::error::{ExtractionError, ParserError};
use crate::platform::cipher::{CipherProgram, Transform};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

const IDENT: &str = r"[a-zA-Z_$][a-zA-Z_0-9$]*";

const REVERSE_BODY: &str = r"function\(a\)\{(?:return )?a\.reverse\(\)\}";
const SLICE_BODY: &str = r"function\(a,b\)\{return a\.slice\(b\)\}";
const SPLICE_BODY: &str = r"function\(a,b\)\{a\.splice\(0,b\)\}";
const SWAP_BODY: &str =
    r"function\(a,b\)\{var c=a\[0\];a\[0\]=a\[b(?:%a\.length)?\];a\[b(?:%a\.length)?\]=c(?:;return a)?\}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Reverse,
    Slice,
    Splice,
    Swap,
}

impl Operation {
    fn with_operand(self, pos: usize) -> Transform {
        match self {
            Operation::Reverse => Transform::Reverse,
            Operation::Slice => Transform::Slice(pos),
            Operation::Splice => Transform::Splice(pos),
            Operation::Swap => Transform::Swap(pos),
        }
    }
}

/// An object literal whose members all match one of the four shapes
struct Definition {
    name: String,
    members: HashMap<String, Operation>,
}

/// Derive the signature program from the text of a player script
pub fn extract(script: &str) -> Result<CipherProgram, ParserError> {
    let definitions = find_definitions(script)?;
    if definitions.is_empty() {
        return Err(ExtractionError::DefinitionNotFound.into());
    }

    let driver = Regex::new(&format!(
        r#"function(?: {IDENT})?\(a\)\{{a=a\.split\(""\);\s*((?:(?:a=)?{IDENT}\.{IDENT}\(a,\d+\);)+)return a\.join\(""\)\}}"#
    ))?;
    let call = Regex::new(&format!(r"(?:a=)?({IDENT})\.({IDENT})\(a,(\d+)\)"))?;

    for candidate in driver.captures_iter(script) {
        let body = match candidate.get(1) {
            Some(body) => body.as_str(),
            None => continue,
        };

        let target = call.captures_iter(body).find_map(|c| {
            let object = c.get(1)?.as_str();
            definitions.iter().find(|d| d.name == object)
        });
        let Some(definition) = target else {
            continue;
        };

        let mut ops = Vec::new();
        for c in call.captures_iter(body) {
            if c.get(1).map(|m| m.as_str()) != Some(definition.name.as_str()) {
                continue;
            }
            let member = c.get(2).map(|m| m.as_str()).unwrap_or_default();
            let Some(op) = definition.members.get(member) else {
                continue;
            };
            let Some(pos) = c.get(3).and_then(|m| m.as_str().parse::<usize>().ok()) else {
                continue;
            };
            ops.push(op.with_operand(pos));
        }

        let program = CipherProgram::new(ops)?;
        debug!("Extracted cipher program via {}: {}", definition.name, program);
        return Ok(program);
    }

    Err(ExtractionError::DriverNotFound.into())
}

fn find_definitions(script: &str) -> Result<Vec<Definition>, ParserError> {
    let any_member = format!("{IDENT}:(?:{REVERSE_BODY}|{SLICE_BODY}|{SPLICE_BODY}|{SWAP_BODY})");
    let object = Regex::new(&format!(
        r"var ({IDENT})=\{{((?:{any_member},?\n?)+)\}};"
    ))?;
    let member = Regex::new(&format!(r"({IDENT}):(function\(a(?:,b)?\)\{{[^}}]*\}})"))?;

    let shapes = [
        (Regex::new(&format!("^{REVERSE_BODY}$"))?, Operation::Reverse),
        (Regex::new(&format!("^{SLICE_BODY}$"))?, Operation::Slice),
        (Regex::new(&format!("^{SPLICE_BODY}$"))?, Operation::Splice),
        (Regex::new(&format!("^{SWAP_BODY}$"))?, Operation::Swap),
    ];

    let mut definitions = Vec::new();
    for captures in object.captures_iter(script) {
        let (Some(name), Some(body)) = (captures.get(1), captures.get(2)) else {
            continue;
        };

        let mut members = HashMap::new();
        for m in member.captures_iter(body.as_str()) {
            let (Some(member_name), Some(member_body)) = (m.get(1), m.get(2)) else {
                continue;
            };
            if let Some((_, op)) = shapes
                .iter()
                .find(|(shape, _)| shape.is_match(member_body.as_str()))
            {
                members.insert(member_name.as_str().to_string(), *op);
            }
        }

        if !members.is_empty() {
            debug!("Found transform object {} with {} members", name.as_str(), members.len());
            definitions.push(Definition {
                name: name.as_str().to_string(),
                members,
            });
        }
    }
    Ok(definitions)
}
