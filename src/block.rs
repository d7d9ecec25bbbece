//! `key {` sections: map bodies, nested records and repeated records.

use std::io::BufRead;

use crate::bind::MapSlot;
use crate::error::Error;
use crate::field::{Shape, Slot};
use crate::reader::Session;
use crate::record::Record;
use crate::schema::{resolve, KeyMap};

impl<B: BufRead> Session<'_, B> {
    /// Read the body of section `key`, whose opening line has just been read.
    pub(crate) fn read_section(
        &mut self,
        target: &mut dyn Record,
        keys: &KeyMap,
        key: &str,
    ) -> Result<(), Error> {
        let invalid = || Error::InvalidSection(key.to_string());
        let locator = keys.get(key).ok_or_else(invalid)?;
        let slot = resolve(target, &locator.path).ok_or_else(invalid)?;
        tracing::trace!(key, shape = %locator.shape, "section");

        let slot = match MapSlot::from_slot(slot) {
            Ok(map) => return self.read_map(map, key),
            Err(slot) => slot,
        };

        match slot {
            Slot::Record(inner) => self.read_nested(inner, key),
            // each occurrence appends one element; it stays even if its body fails
            Slot::Sequence(seq) => match seq.push_section() {
                Some(element) => self.read_nested(element, key),
                None => Err(Error::InvalidBlockType {
                    key: key.to_string(),
                    shape: Shape::Sequence,
                }),
            },
            slot => Err(Error::InvalidBlockType {
                key: key.to_string(),
                shape: slot.shape(),
            }),
        }
    }

    /// Read `name value...` lines into a map until the closing `}`.
    fn read_map(&mut self, mut map: MapSlot<'_>, key: &str) -> Result<(), Error> {
        while let Some(line) = self.lines.next_line()? {
            let Some((name, values)) = line.tokens.split_first() else {
                continue;
            };
            if line.is_block_end() {
                return Ok(());
            }
            tracing::trace!(line = line.number, key, name = name.as_str(), "map entry");
            map.put(key, name, values)?;
        }
        Err(Error::UnclosedBlock(key.to_string()))
    }
}
