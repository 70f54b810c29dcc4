//! Reflection for standard library types
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use super::{EntryVisitor, Kind, Leaf, LeafSlot, Mapping, Reflect, Sequence, ValueMut, ValueVisitor};
use crate::Result;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};

impl LeafSlot for String {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn take(&mut self) -> Leaf {
        Leaf::String(std::mem::take(self))
    }

    fn store(&mut self, leaf: Leaf) -> std::result::Result<(), Kind> {
        match leaf {
            Leaf::String(value) => {
                *self = value;
                Ok(())
            }
            other => Err(other.kind()),
        }
    }
}

macro_rules! copy_leaf {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl LeafSlot for $ty {
            fn kind(&self) -> Kind {
                Kind::$variant
            }

            fn take(&mut self) -> Leaf {
                Leaf::$variant(*self)
            }

            fn store(&mut self, leaf: Leaf) -> std::result::Result<(), Kind> {
                match leaf {
                    Leaf::$variant(value) => {
                        *self = value;
                        Ok(())
                    }
                    other => Err(other.kind()),
                }
            }
        }
    )*};
}

copy_leaf!(bool => Bool, char => Char, f32 => F32, f64 => F64);

// Integers travel as 64-bit values and are narrowed again on store.
macro_rules! int_leaf {
    ($variant:ident, $wide:ty: $($ty:ty),*) => {$(
        impl LeafSlot for $ty {
            fn kind(&self) -> Kind {
                Kind::$variant
            }

            fn take(&mut self) -> Leaf {
                Leaf::$variant(*self as $wide)
            }

            fn store(&mut self, leaf: Leaf) -> std::result::Result<(), Kind> {
                match leaf {
                    Leaf::$variant(value) => {
                        *self = <$ty>::try_from(value).map_err(|_| Kind::$variant)?;
                        Ok(())
                    }
                    other => Err(other.kind()),
                }
            }
        }
    )*};
}

int_leaf!(Int, i64: i8, i16, i32, i64, isize);
int_leaf!(Uint, u64: u8, u16, u32, u64, usize);

macro_rules! leaf_reflect {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            fn reflect_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Leaf(self)
            }
        }
    )*};
}

leaf_reflect!(
    String, bool, char, f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize
);

impl Reflect for () {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Nil
    }

    fn is_untyped_nil(&self) -> bool {
        true
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        match self {
            Some(value) => ValueMut::Indirect(value),
            None => ValueMut::Nil,
        }
    }
}

// Boxes are transparent, including `Box<dyn Reflect>`.
impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        (**self).reflect_mut()
    }

    fn is_untyped_nil(&self) -> bool {
        (**self).is_untyped_nil()
    }
}

impl<T: Reflect> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|element| element as &mut dyn Reflect)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }
}

impl<T: Reflect> Sequence for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|element| element as &mut dyn Reflect)
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn kind(&self) -> Kind {
        Kind::Array
    }

    fn len(&self) -> usize {
        N
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|element| element as &mut dyn Reflect)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }
}

/// Feed drained entries through `visit` and hand each one back to `insert`
pub(super) fn rekey_drained<K, V>(
    entries: impl IntoIterator<Item = (K, V)>,
    visit: &mut EntryVisitor<'_>,
    mut insert: impl FnMut(K, V),
) -> Result<()>
where
    K: Reflect,
    V: Reflect,
{
    let mut entries = entries.into_iter();
    while let Some((mut key, mut value)) = entries.next() {
        let outcome = visit(&mut key, &mut value);
        insert(key, value);
        if let Err(err) = outcome {
            for (key, value) in entries {
                insert(key, value);
            }
            return Err(err);
        }
    }
    Ok(())
}

impl<K, V, S> Mapping for HashMap<K, V, S>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn visit_values(&mut self, visit: &mut ValueVisitor<'_>) -> Result<()> {
        for value in self.values_mut() {
            visit(value)?;
        }
        Ok(())
    }

    fn rekey_entries(&mut self, visit: &mut EntryVisitor<'_>) -> Result<()> {
        let drained: Vec<(K, V)> = self.drain().collect();
        rekey_drained(drained, visit, |key, value| {
            self.insert(key, value);
        })
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
    S: BuildHasher,
{
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Map(self)
    }
}

impl<K, V> Mapping for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn visit_values(&mut self, visit: &mut ValueVisitor<'_>) -> Result<()> {
        for value in self.values_mut() {
            visit(value)?;
        }
        Ok(())
    }

    fn rekey_entries(&mut self, visit: &mut EntryVisitor<'_>) -> Result<()> {
        let drained = std::mem::take(self);
        rekey_drained(drained, visit, |key, value| {
            self.insert(key, value);
        })
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Map(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_store_narrows() {
        let mut small: u8 = 7;
        assert_eq!(small.take(), Leaf::Uint(7));
        assert_eq!(small.store(Leaf::Uint(300)), Err(Kind::Uint));
        assert_eq!(small.store(Leaf::Uint(42)), Ok(()));
        assert_eq!(small, 42);
        assert_eq!(small.store(Leaf::Int(1)), Err(Kind::Int));
    }

    #[test]
    fn test_string_take_and_store() {
        let mut value = " data ".to_string();
        let leaf = value.take();
        assert_eq!(leaf, Leaf::String(" data ".into()));
        assert_eq!(value.store(Leaf::String("data".into())), Ok(()));
        assert_eq!(value, "data");
    }

    #[test]
    fn test_rekey_keeps_every_entry_on_error() {
        let mut map: BTreeMap<String, String> = [("a", "1"), ("b", "2"), ("c", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut seen = 0;
        let result = map.rekey_entries(&mut |_key, _value| {
            seen += 1;
            if seen == 2 {
                return Err(crate::Error::NotAStruct);
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_array_reports_array_kind() {
        let mut values = [1u32, 2, 3];
        assert_eq!(values.reflect_mut().kind(), Kind::Array);
        let mut values = vec![1u32];
        assert_eq!(values.reflect_mut().kind(), Kind::Slice);
    }
}
