//! Key maps: which config key binds which record field.
//!
//! A key map is learned once per record type and cached for the rest of the
//! read, including any files it includes.

use std::any::TypeId;
use std::collections::HashMap;
use std::rc::Rc;

use crate::convert::Convert;
use crate::field::{Shape, Slot};
use crate::record::Record;

/// Where a key's field lives, and how to convert into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLocator {
    /// Rust field names from the root record down to the field. Longer than
    /// one step for keys promoted from embedded records.
    pub path: Vec<&'static str>,
    pub convert: Option<Convert>,
    pub shape: Shape,
}

/// Lowercased config key to field locator, for one record type.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    fields: HashMap<String, FieldLocator>,
}

impl KeyMap {
    /// Build the key map for `target`'s type.
    ///
    /// When two fields answer to the same key the later declaration wins.
    /// Keys promoted from an embedded record never shadow the embedding
    /// record's own keys.
    pub fn learn(target: &mut dyn Record) -> Self {
        let mut fields = HashMap::new();
        collect(target, &[], &mut fields);
        Self { fields }
    }

    /// Look up a key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&FieldLocator> {
        self.fields
            .get(key)
            .or_else(|| self.fields.get(&key.to_lowercase()))
    }

    pub(crate) fn len(&self) -> usize {
        self.fields.len()
    }
}

fn collect(
    target: &mut dyn Record,
    prefix: &[&'static str],
    fields: &mut HashMap<String, FieldLocator>,
) {
    let record = target.record_name();
    let mut embedded = Vec::new();

    for spec in target.fields() {
        let Some(slot) = target.field_mut(spec.name) else {
            tracing::trace!(record, field = spec.name, "field has no accessor");
            continue;
        };
        let shape = slot.shape();

        let mut path = prefix.to_vec();
        path.push(spec.name);

        let key = spec.config_key();
        tracing::trace!(record, %key, %shape, "learned field");

        if spec.embedded {
            embedded.push((spec.name, path.clone()));
        }
        fields.insert(
            key,
            FieldLocator {
                path,
                convert: spec.convert,
                shape,
            },
        );
    }

    for (name, path) in embedded {
        let Some(Slot::Record(inner)) = target.field_mut(name) else {
            continue;
        };
        let mut promoted = HashMap::new();
        collect(inner, &path, &mut promoted);
        for (key, locator) in promoted {
            fields.entry(key).or_insert(locator);
        }
    }
}

/// Borrow the field a locator points at.
pub(crate) fn resolve<'a>(target: &'a mut dyn Record, path: &[&str]) -> Option<Slot<'a>> {
    let (last, parents) = path.split_last()?;
    let mut current = target;
    for name in parents {
        current = match current.field_mut(name)? {
            Slot::Record(inner) => inner,
            _ => return None,
        };
    }
    current.field_mut(last)
}

/// Key maps learned during one read, by record type.
#[derive(Debug, Default)]
pub struct SchemaCache {
    maps: HashMap<TypeId, Rc<KeyMap>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key map for `target`'s type, learning it on first use.
    pub fn key_map(&mut self, target: &mut dyn Record) -> Rc<KeyMap> {
        let record_type = target.record_type();
        if let Some(map) = self.maps.get(&record_type) {
            return Rc::clone(map);
        }

        let map = Rc::new(KeyMap::learn(target));
        self.maps.insert(record_type, Rc::clone(&map));
        tracing::debug!(
            record = target.record_name(),
            keys = map.len(),
            cached = self.len(),
            "learned key map"
        );
        map
    }

    /// Number of record types learned so far.
    pub(crate) fn len(&self) -> usize {
        self.maps.len()
    }
}
