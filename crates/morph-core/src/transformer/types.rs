//! Core types for the transformer protocol
//!
//! A transformer is compiled once per annotation occurrence through
//! [`Transformer::cache`] and then invoked any number of times through
//! [`Transformer::transform`], always with the same [`ParamsKey`].
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use crate::reflect::{Leaf, ShapeId};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

/// Capability implemented by every directive that mutates values
pub trait Transformer: Send + Sync {
    /// Parse and store the directive parameters under `key`.
    ///
    /// Runs once per annotation occurrence, before any `transform` call with the
    /// same key. Must tolerate being called again for a key it has already seen.
    fn cache(&self, params: &str, key: &ParamsKey) -> Result<()>;

    /// Mutate the working copy in place.
    ///
    /// Check `value.kind()` first and fail with [`Error::UnexpectedValue`] when
    /// the directive does not apply to it.
    fn transform(&self, value: &mut Leaf, key: &ParamsKey) -> Result<()>;
}

/// Whatever owns an annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyOwner {
    /// A record field, by position
    Field { shape: ShapeId, index: usize },
    /// An annotation applied directly through `Morpher::apply`
    Inline(Arc<str>),
}

/// Key of the parameter store: one directive occurrence inside one annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamsKey {
    owner: KeyOwner,
    position: usize,
}

impl ParamsKey {
    pub fn new(owner: KeyOwner, position: usize) -> Self {
        Self { owner, position }
    }

    pub fn owner(&self) -> &KeyOwner {
        &self.owner
    }

    /// Token position of the directive within its annotation
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for ParamsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            KeyOwner::Field { shape, index } => write!(f, "{:?}.{}#{}", shape, index, self.position),
            KeyOwner::Inline(annotation) => write!(f, "'{}'#{}", annotation, self.position),
        }
    }
}

/// Parameter store shared by all invocations of one transformer
#[derive(Debug)]
pub struct ParamTable<T> {
    values: RwLock<HashMap<ParamsKey, T>>,
}

impl<T: Clone> ParamTable<T> {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Store the parsed parameter for `key`, replacing any earlier value
    pub fn insert(&self, key: &ParamsKey, value: T) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), value);
    }

    /// Parsed parameter for `key`, if `cache` ran for it
    pub fn get(&self, key: &ParamsKey) -> Option<T> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Parsed parameter for `key`, or `MissingParameters` naming `tag`
    pub fn require(&self, key: &ParamsKey, tag: &str) -> Result<T> {
        self.get(key).ok_or_else(|| Error::missing_parameters(tag))
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for ParamTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a directive parameter, mapping failure to `InvalidParameters`
pub fn parse_param<T: FromStr>(params: &str, tag: &str) -> Result<T> {
    params
        .trim()
        .parse()
        .map_err(|_| Error::invalid_parameters(params, tag))
}

/// Parameterless transformer backed by a closure
pub struct FnTransformer<F> {
    func: F,
}

impl<F> FnTransformer<F>
where
    F: Fn(&mut Leaf) -> Result<()> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(&mut Leaf) -> Result<()> + Send + Sync,
{
    fn cache(&self, _params: &str, _key: &ParamsKey) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &mut Leaf, _key: &ParamsKey) -> Result<()> {
        (self.func)(value)
    }
}

impl<F> fmt::Debug for FnTransformer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransformer").finish_non_exhaustive()
    }
}
