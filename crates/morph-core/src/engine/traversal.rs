//! Chain execution over live values
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use crate::cache::Cache;
use crate::chain::Instruction;
use crate::reflect::{Leaf, LeafSlot, Mapping, Record, Reflect, Sequence, ValueMut};
use crate::{Error, Result};
use tracing::trace;

/// Walks one value tree against the compiled state of a `Morpher`
pub(crate) struct Walker<'c> {
    cache: &'c Cache,
}

impl<'c> Walker<'c> {
    pub fn new(cache: &'c Cache) -> Self {
        Self { cache }
    }

    /// Apply every field chain of `record`, recursing into nested records
    pub fn record(&self, record: &mut dyn Record) -> Result<()> {
        let descriptor = self.cache.shape(&record.shape())?;

        for field in descriptor.fields() {
            let Some(value) = record.field_mut(field.index) else {
                continue;
            };
            trace!("Morphing {}.{}", descriptor.name(), field.name);

            let chain = field
                .chain
                .as_ref()
                .map(|chain| chain.instructions())
                .unwrap_or_default();
            self.value(value.reflect_mut(), chain)?;
        }

        Ok(())
    }

    /// Apply `chain` to one value
    pub fn value(&self, handle: ValueMut<'_>, chain: &[Instruction]) -> Result<()> {
        match handle.resolve() {
            ValueMut::Nil | ValueMut::Indirect(_) => Ok(()),
            ValueMut::Record(record) => self.record(record),
            ValueMut::Leaf(slot) => self.leaf(slot, chain),
            container => self.container(container, chain),
        }
    }

    fn leaf(&self, slot: &mut dyn LeafSlot, chain: &[Instruction]) -> Result<()> {
        let mutates = chain
            .iter()
            .any(|instruction| matches!(instruction, Instruction::Dive | Instruction::Transform(_)));
        if !mutates {
            return Ok(());
        }

        let mut working = slot.take();
        let mut last_tag = "";
        let mut outcome = Ok(());

        for instruction in chain {
            match instruction {
                Instruction::Dive => {
                    outcome = Err(Error::InvalidDive {
                        kind: working.kind(),
                    });
                    break;
                }
                Instruction::Transform(call) => {
                    last_tag = call.tag.as_str();
                    if let Err(err) = call.transformer.transform(&mut working, &call.key) {
                        outcome = Err(err);
                        break;
                    }
                }
                Instruction::Keys(_) | Instruction::Skip(_) => {}
            }
        }

        // The slot was emptied by `take`, so the working copy always goes back.
        if let Err(kind) = slot.store(working) {
            outcome = outcome.and(Err(Error::unexpected_value(kind, last_tag)));
        }
        outcome
    }

    fn container(&self, container: ValueMut<'_>, chain: &[Instruction]) -> Result<()> {
        let kind = container.kind();

        for (position, instruction) in chain.iter().enumerate() {
            match instruction {
                Instruction::Dive => return self.dive(container, &chain[position + 1..]),
                Instruction::Transform(call) => {
                    let mut opaque = Leaf::Opaque(kind);
                    call.transformer.transform(&mut opaque, &call.key)?;
                    if opaque != Leaf::Opaque(kind) {
                        return Err(Error::unexpected_value(opaque.kind(), call.tag.as_str()));
                    }
                }
                Instruction::Keys(_) | Instruction::Skip(_) => {}
            }
        }

        Ok(())
    }

    fn dive(&self, container: ValueMut<'_>, rest: &[Instruction]) -> Result<()> {
        match container {
            ValueMut::Sequence(sequence) => self.sequence(sequence, rest),
            ValueMut::Map(map) => self.map(map, rest),
            other => Err(Error::InvalidDive { kind: other.kind() }),
        }
    }

    fn sequence(&self, sequence: &mut dyn Sequence, rest: &[Instruction]) -> Result<()> {
        for index in 0..sequence.len() {
            if let Some(element) = sequence.element_mut(index) {
                self.value(element.reflect_mut(), rest)?;
            }
        }
        Ok(())
    }

    fn map(&self, map: &mut dyn Mapping, rest: &[Instruction]) -> Result<()> {
        match rest.split_first() {
            Some((Instruction::Keys(Some(keys)), values)) => {
                map.rekey_entries(&mut |key: &mut dyn Reflect, value: &mut dyn Reflect| {
                    self.value(key.reflect_mut(), keys.instructions())?;
                    self.value(value.reflect_mut(), values)
                })
            }
            _ => map.visit_values(&mut |value: &mut dyn Reflect| self.value(value.reflect_mut(), rest)),
        }
    }
}
