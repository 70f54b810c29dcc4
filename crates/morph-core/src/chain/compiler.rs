//! Annotation compiler
//!
//! Compilation resolves every directive against the transformer registry and
//! runs [`Transformer::cache`] for it immediately, so parameter errors surface
//! when a shape is first seen rather than in the middle of a traversal.
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use super::{Chain, Instruction, TransformCall, PARAMS_SIGN, TAG_DIVE, TAG_EXIT, TAG_IGNORE, TAG_KEYS, TAG_SEPARATOR};
use crate::transformer::{KeyOwner, ParamsKey, Transformer};
use crate::{Error, Result};
use std::sync::Arc;

/// Split a token on the first parameter sign.
///
/// A sign in first position is not a separator, so `"=5"` stays a
/// directive name and fails resolution.
pub fn split_token(token: &str) -> (&str, Option<&str>) {
    match token.find(PARAMS_SIGN) {
        Some(index) if index > 0 => (&token[..index], Some(&token[index + 1..])),
        _ => (token, None),
    }
}

/// Compiles annotations owned by one field or inline annotation
pub struct ChainCompiler<'a, L> {
    lookup: &'a L,
    owner: KeyOwner,
}

impl<'a, L> ChainCompiler<'a, L>
where
    L: Fn(&str) -> Option<Arc<dyn Transformer>>,
{
    /// `lookup` resolves directive names against the registry
    pub fn new(lookup: &'a L, owner: KeyOwner) -> Self {
        Self { lookup, owner }
    }

    /// Compile `annotation`, or `None` when it has no directives at all
    pub fn compile(&self, annotation: &str) -> Result<Option<Chain>> {
        let tokens: Vec<&str> = annotation
            .split(TAG_SEPARATOR)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.is_empty() {
            return Ok(None);
        }

        let mut instructions = Vec::with_capacity(tokens.len());
        let mut position = 0;
        while position < tokens.len() {
            let instruction = self.compile_token(tokens[position], position)?;
            position += 1;

            if !matches!(instruction, Instruction::Keys(_)) || position == tokens.len() {
                instructions.push(instruction);
                continue;
            }

            let mut keys = Vec::new();
            while position < tokens.len() {
                let token = tokens[position];
                position += 1;
                if split_token(token).0 == TAG_EXIT {
                    break;
                }
                keys.push(self.compile_token(token, position - 1)?);
            }
            let keys = (!keys.is_empty()).then(|| Chain::new(keys));
            instructions.push(Instruction::Keys(keys));
        }

        Ok(Some(Chain::new(instructions)))
    }

    fn compile_token(&self, token: &str, position: usize) -> Result<Instruction> {
        let (name, params) = split_token(token);

        if let Some(transformer) = (self.lookup)(name) {
            let key = ParamsKey::new(self.owner.clone(), position);
            transformer.cache(params.unwrap_or_default(), &key)?;
            return Ok(Instruction::Transform(TransformCall {
                tag: name.to_string(),
                params: params.map(str::to_string),
                key,
                transformer,
            }));
        }

        match name {
            TAG_DIVE => Ok(Instruction::Dive),
            TAG_KEYS => Ok(Instruction::Keys(None)),
            TAG_EXIT | TAG_IGNORE => Ok(Instruction::Skip(name.to_string())),
            _ => Err(Error::unknown_tag(name)),
        }
    }
}
