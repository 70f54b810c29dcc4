//! Compiled state shared by every traversal
//!
//! The transformer registry, the shape descriptors and the inline annotation
//! chains all live behind one reader/writer lock. Lookups take the read lock.
//! Registration and first-time population take the write lock. Compilation
//! itself, and therefore every `Transformer::cache` call, runs with the lock
//! released.
//!
//! Two threads missing the same shape at the same time may both compile it.
//! Compilation is pure, so whichever insert lands last wins and both results
//! are equivalent. Failed compilations are never stored, and neither is a
//! result whose build overlapped a registration or a tag switch: `generation`
//! moves on every such change, and a build only inserts if it saw the
//! generation still current.
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use crate::chain::{Chain, ChainCompiler, TAG_IGNORE};
use crate::reflect::{Shape, ShapeId};
use crate::transformer::{built_in, KeyOwner, Transformer};
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Inline chains kept before the table is emptied and refilled on demand
pub(crate) const INLINE_CAPACITY: usize = 1024;

/// One eligible field of a record shape
#[derive(Debug)]
pub struct FieldDescriptor {
    /// Position of the field in its record
    pub index: usize,
    pub name: &'static str,
    pub chain: Option<Chain>,
}

/// Eligible fields of one record shape, in declaration order
#[derive(Debug)]
pub struct ShapeDescriptor {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl ShapeDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

struct State {
    tag: String,
    transformers: HashMap<String, Arc<dyn Transformer>>,
    shapes: HashMap<ShapeId, Arc<ShapeDescriptor>>,
    inline: HashMap<String, Arc<Chain>>,
    generation: u64,
}

impl State {
    fn invalidate(&mut self) {
        self.generation += 1;
        self.shapes.clear();
        self.inline.clear();
    }
}

pub(crate) struct Cache {
    state: RwLock<State>,
}

impl Cache {
    pub fn new(tag: &str) -> Self {
        let transformers = built_in::defaults()
            .into_iter()
            .map(|(name, transformer)| (name.to_string(), transformer))
            .collect();

        Self {
            state: RwLock::new(State {
                tag: tag.to_string(),
                transformers,
                shapes: HashMap::new(),
                inline: HashMap::new(),
                generation: 0,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned morph cache lock");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned morph cache lock");
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn tag(&self) -> String {
        self.read().tag.clone()
    }

    /// Switch the annotation key. Shapes compiled under the old key are dropped.
    pub fn set_tag(&self, tag: &str) {
        let mut state = self.write();
        if state.tag != tag {
            state.tag = tag.to_string();
            state.generation += 1;
            state.shapes.clear();
        }
    }

    pub fn transformer(&self, name: &str) -> Option<Arc<dyn Transformer>> {
        self.read().transformers.get(name).cloned()
    }

    pub fn transformer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().transformers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Install or overwrite a transformer and drop everything compiled so far
    pub fn register(&self, name: &str, transformer: Arc<dyn Transformer>) {
        let mut state = self.write();
        state.transformers.insert(name.to_string(), transformer);
        state.invalidate();
    }

    /// Descriptor for `shape`, compiling it on first use
    pub fn shape(&self, shape: &Shape) -> Result<Arc<ShapeDescriptor>> {
        let generation = {
            let state = self.read();
            if let Some(descriptor) = state.shapes.get(&shape.id()) {
                return Ok(descriptor.clone());
            }
            state.generation
        };

        let descriptor = Arc::new(self.build_shape(shape)?);
        let mut state = self.write();
        if state.generation == generation {
            state.shapes.insert(shape.id(), descriptor.clone());
        }
        Ok(descriptor)
    }

    fn build_shape(&self, shape: &Shape) -> Result<ShapeDescriptor> {
        let tag = self.tag();
        let lookup = |name: &str| self.transformer(name);
        let mut fields = Vec::with_capacity(shape.fields().len());

        for field in shape.fields() {
            if !field.exported {
                continue;
            }

            let annotation = field.tag(&tag).unwrap_or_default();
            if annotation == TAG_IGNORE {
                continue;
            }

            let owner = KeyOwner::Field {
                shape: shape.id(),
                index: field.index,
            };
            let chain = ChainCompiler::new(&lookup, owner).compile(annotation)?;
            fields.push(FieldDescriptor {
                index: field.index,
                name: field.name,
                chain,
            });
        }

        debug!(
            "Compiled shape descriptor for {} ({} of {} fields eligible)",
            shape.name(),
            fields.len(),
            shape.fields().len()
        );

        Ok(ShapeDescriptor {
            name: shape.name(),
            fields,
        })
    }

    /// Compiled chain for an inline annotation, compiling it on first use
    pub fn inline(&self, annotation: &str) -> Result<Arc<Chain>> {
        let generation = {
            let state = self.read();
            if let Some(chain) = state.inline.get(annotation) {
                return Ok(chain.clone());
            }
            state.generation
        };

        let lookup = |name: &str| self.transformer(name);
        let owner = KeyOwner::Inline(Arc::from(annotation));
        let chain = ChainCompiler::new(&lookup, owner)
            .compile(annotation)?
            .unwrap_or_default();
        debug!("Compiled inline chain '{}' as [{}]", annotation, chain);

        let chain = Arc::new(chain);
        let mut state = self.write();
        if state.generation == generation {
            if state.inline.len() >= INLINE_CAPACITY {
                debug!("Inline chain cache full, dropping {} chains", state.inline.len());
                state.inline.clear();
            }
            state.inline.insert(annotation.to_string(), chain.clone());
        }
        Ok(chain)
    }

    #[cfg(test)]
    pub fn shape_count(&self) -> usize {
        self.read().shapes.len()
    }

    #[cfg(test)]
    pub fn inline_count(&self) -> usize {
        self.read().inline.len()
    }
}
