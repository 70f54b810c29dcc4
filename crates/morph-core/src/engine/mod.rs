//! The `Morpher` entry point
//!
//! A [`Morpher`] owns the transformer registry and everything compiled from
//! it. It is cheap to clone and clones share state, so one instance can serve
//! any number of threads.
//!
//! # Examples
//!
//! ```
//! use morph_core::{Morpher, Record};
//!
//! #[derive(Record)]
//! struct Signup {
//!     #[morph("trim,lower")]
//!     pub email: String,
//!     #[morph("dive,trim")]
//!     pub tags: Vec<String>,
//! }
//!
//! let mut signup = Signup {
//!     email: "  Bob@Example.COM ".to_string(),
//!     tags: vec![" a ".to_string(), "b ".to_string()],
//! };
//!
//! Morpher::new().morph(&mut signup).unwrap();
//! assert_eq!(signup.email, "bob@example.com");
//! assert_eq!(signup.tags, ["a", "b"]);
//! ```
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

mod traversal;


use crate::cache::Cache;
use crate::chain::{is_navigation, Chain, DEFAULT_TAG, TAG_IGNORE};
use crate::config::MorphConfig;
use crate::reflect::{Reflect, ValueMut};
use crate::transformer::Transformer;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use traversal::Walker;

/// Annotation-driven in-place normalizer
#[derive(Clone)]
pub struct Morpher {
    cache: Arc<Cache>,
}

impl Morpher {
    /// Morpher reading the `morph` annotation key, with every built-in registered
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Cache::new(DEFAULT_TAG)),
        }
    }

    /// Read annotations from `tag` instead of `morph`.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is blank. A blank key can only be a programming error.
    pub fn with_tag(self, tag: &str) -> Self {
        let tag = tag.trim();
        if tag.is_empty() {
            panic!("{}", Error::InvalidTagName);
        }
        self.cache.set_tag(tag);
        self
    }

    /// Build a morpher from configuration, reporting bad values as errors
    pub fn from_config(config: &MorphConfig) -> Result<Self> {
        if config.tag.trim().is_empty() {
            return Err(Error::InvalidTagName);
        }

        let morpher = Self::new().with_tag(&config.tag);
        for (name, existing) in &config.aliases {
            morpher.alias(name, existing)?;
        }
        Ok(morpher)
    }

    /// Annotation key currently in use
    pub fn tag(&self) -> String {
        self.cache.tag()
    }

    /// Registered directive names, sorted
    pub fn transformers(&self) -> Vec<String> {
        self.cache.transformer_names()
    }

    /// Install `transformer` under `name`, replacing any earlier one.
    ///
    /// Fails with `InvalidTagName` for a blank name and `ReservedTagOverride`
    /// for a navigation directive.
    pub fn register<T>(&self, name: &str, transformer: T) -> Result<()>
    where
        T: Transformer + 'static,
    {
        self.register_shared(name, Arc::new(transformer))
    }

    /// Like [`register`](Self::register), for a transformer that is already shared
    pub fn register_shared(&self, name: &str, transformer: Arc<dyn Transformer>) -> Result<()> {
        let name = Self::registrable(name)?;
        self.cache.register(name, transformer);
        debug!("Registered transformer '{}'", name);
        Ok(())
    }

    /// Make `existing` available under `name` as well
    pub fn alias(&self, name: &str, existing: &str) -> Result<()> {
        let name = Self::registrable(name)?;
        let transformer = self
            .cache
            .transformer(existing.trim())
            .ok_or(Error::InvalidTransformer)?;
        self.cache.register(name, transformer);
        debug!("Registered '{}' as an alias of '{}'", name, existing);
        Ok(())
    }

    fn registrable(name: &str) -> Result<&str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidTagName);
        }
        if is_navigation(name) {
            return Err(Error::ReservedTagOverride {
                tag: name.to_string(),
            });
        }
        Ok(name)
    }

    /// Normalize every annotated field of `target` in place.
    ///
    /// `target` must resolve to a record. An untyped nil such as `()` or JSON
    /// `null` is `NotAPointer`; a `None` or any non-record value is
    /// `NotAStruct`. The first error aborts the walk and fields processed
    /// before it stay mutated.
    pub fn morph<R>(&self, target: &mut R) -> Result<()>
    where
        R: Reflect + ?Sized,
    {
        if target.is_untyped_nil() {
            return Err(Error::NotAPointer);
        }
        match target.reflect_mut().resolve() {
            ValueMut::Record(record) => Walker::new(&self.cache).record(record),
            _ => Err(Error::NotAStruct),
        }
    }

    /// Apply an annotation directly to `value`, which may be of any kind.
    ///
    /// Nested records are still normalized through their own annotations.
    ///
    /// Compiled chains are cached per annotation string, up to a fixed number
    /// before the cache starts over. Parameterised transformers keep one
    /// parsed parameter per distinct annotation for the life of the
    /// `Morpher`, so prefer a fixed set of annotations over ones built from
    /// untrusted input.
    pub fn apply<R>(&self, value: &mut R, annotation: &str) -> Result<()>
    where
        R: Reflect + ?Sized,
    {
        if annotation == TAG_IGNORE {
            return Ok(());
        }
        let chain = self.cache.inline(annotation)?;
        Walker::new(&self.cache).value(value.reflect_mut(), chain.instructions())
    }

    /// Compile `annotation` without applying it
    pub fn compile(&self, annotation: &str) -> Result<Arc<Chain>> {
        self.cache.inline(annotation)
    }
}

impl Default for Morpher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Morpher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Morpher")
            .field("tag", &self.tag())
            .field("transformers", &self.transformers())
            .finish()
    }
}
