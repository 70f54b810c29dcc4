//! Annotation chains
//!
//! An annotation is a comma separated list of directives such as
//! `"dive,keys,trim,exit,trim"`. The [`compiler`] turns it into a [`Chain`]:
//! a flat list of [`Instruction`]s where the key sub-chain of a `keys`
//! directive is embedded in the instruction itself. Chains are immutable once
//! built and are shared by every value of their owning shape.
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

pub mod compiler;


pub use compiler::ChainCompiler;

use crate::transformer::{ParamsKey, Transformer};
use std::fmt;
use std::sync::Arc;

/// Annotation key looked up on record fields unless configured otherwise
pub const DEFAULT_TAG: &str = "morph";
/// Enters the elements of a sequence or the entries of a map
pub const TAG_DIVE: &str = "dive";
/// Switches to map-key context until `exit`
pub const TAG_KEYS: &str = "keys";
/// Returns from map-key context to map-value context
pub const TAG_EXIT: &str = "exit";
/// As a whole annotation, skips the field entirely
pub const TAG_IGNORE: &str = "-";
pub const TAG_SEPARATOR: char = ',';
pub const PARAMS_SIGN: char = '=';

/// Directive names that can never be registered as transformers
pub const RESERVED_TAGS: [&str; 4] = [TAG_DIVE, TAG_KEYS, TAG_EXIT, TAG_IGNORE];

/// Whether `name` is a navigation directive
pub fn is_navigation(name: &str) -> bool {
    RESERVED_TAGS.contains(&name)
}

/// One compiled directive
#[derive(Debug, Clone)]
pub enum Instruction {
    /// Apply the rest of the chain to every element or map value
    Dive,
    /// Map-key context. Carries the key sub-chain, if any directives followed.
    Keys(Option<Chain>),
    /// Invoke a transformer on the current value
    Transform(TransformCall),
    /// Navigation directive with nothing to do at this position
    Skip(String),
}

impl Instruction {
    /// Directive name as written in the annotation
    pub fn name(&self) -> &str {
        match self {
            Instruction::Dive => TAG_DIVE,
            Instruction::Keys(_) => TAG_KEYS,
            Instruction::Transform(call) => &call.tag,
            Instruction::Skip(name) => name,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Keys(Some(keys)) => write!(f, "{}[{}]", TAG_KEYS, keys),
            Instruction::Transform(call) => match &call.params {
                Some(params) => write!(f, "{}{}{}", call.tag, PARAMS_SIGN, params),
                None => f.write_str(&call.tag),
            },
            other => f.write_str(other.name()),
        }
    }
}

/// A resolved transformer together with its compiled parameters
#[derive(Clone)]
pub struct TransformCall {
    pub tag: String,
    /// Raw parameter string, when the directive carried one
    pub params: Option<String>,
    /// Key the parameters were compiled under
    pub key: ParamsKey,
    pub transformer: Arc<dyn Transformer>,
}

impl fmt::Debug for TransformCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformCall")
            .field("tag", &self.tag)
            .field("params", &self.params)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Compiled annotation
#[derive(Debug, Clone, Default)]
pub struct Chain {
    instructions: Vec<Instruction>,
}

impl Chain {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Whether the chain has a `dive` anywhere, key sub-chains included
    pub fn dives(&self) -> bool {
        self.instructions.iter().any(|instruction| match instruction {
            Instruction::Dive => true,
            Instruction::Keys(Some(keys)) => keys.dives(),
            _ => false,
        })
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, instruction) in self.instructions.iter().enumerate() {
            if position > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
