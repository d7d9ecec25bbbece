//! Binding one config line's text into a field.

use serde_json::Value;

use crate::convert::{parse_bool, parse_duration, parse_duration_expr, parse_int, Convert};
use crate::error::Error;
use crate::field::{Keyed, Slot};
use crate::record::Record;
use crate::schema::{resolve, KeyMap};

/// Bind `key value extra...` into the field `key` names in `target`.
pub(crate) fn bind_key(
    target: &mut dyn Record,
    keys: &KeyMap,
    key: &str,
    value: &str,
    extra: &[String],
) -> Result<(), Error> {
    let invalid = || Error::InvalidParam(key.to_string());
    let locator = keys.get(key).ok_or_else(invalid)?;
    let slot = resolve(target, &locator.path).ok_or_else(invalid)?;
    bind(slot, locator.convert, key, value, extra)
}

/// Convert `value` (and `extra`, for multi-value shapes) into `slot`.
pub(crate) fn bind(
    slot: Slot<'_>,
    convert: Option<Convert>,
    key: &str,
    value: &str,
    extra: &[String],
) -> Result<(), Error> {
    let slot = match MapSlot::from_slot(slot) {
        Ok(mut map) => return map.put(key, value, extra),
        Err(slot) => slot,
    };

    match slot {
        Slot::ParseStr(target) => target
            .parse_str(value)
            .map_err(|e| Error::invalid_value(key, target.type_name(), e)),
        Slot::ParseBytes(target) => target
            .parse_bytes(value.as_bytes())
            .map_err(|e| Error::invalid_value(key, target.type_name(), e)),
        Slot::Duration(target) => {
            *target = parse_duration(value).map_err(|e| Error::invalid_value(key, "duration", e))?;
            Ok(())
        }
        Slot::Sequence(seq) => {
            // one element per token: "param v1 v2 v3"
            for item in std::iter::once(value).chain(extra.iter().map(String::as_str)) {
                seq.push_with(&mut |slot| bind(slot, convert, key, item, &[]))?;
            }
            Ok(())
        }
        Slot::Text(target) => {
            *target = value.to_string();
            Ok(())
        }
        Slot::Integer(target) => {
            let number = match convert {
                Some(Convert::Duration) => parse_duration_expr(value)
                    .map_err(|e| Error::invalid_value(key, "duration", e))?,
                None => parse_int(value).map_err(|e| Error::invalid_value(key, "number", e))?,
            };
            target
                .set_i64(number)
                .map_err(|e| Error::invalid_value(key, "number", e))
        }
        Slot::Float(target) => {
            let number: f64 = value
                .parse()
                .map_err(|e| Error::invalid_value(key, "number", e))?;
            target.set_f64(number);
            Ok(())
        }
        Slot::Bool(target) => {
            *target = parse_bool(value);
            Ok(())
        }
        slot => Err(Error::UnsupportedType {
            key: key.to_string(),
            shape: slot.shape(),
        }),
    }
}

/// The string-keyed map shapes, which share one entry syntax both on a
/// single line (`field name value`) and inside a section (`name value`).
pub(crate) enum MapSlot<'a> {
    Bool(&'a mut dyn Keyed<bool>),
    Set(&'a mut dyn Keyed<()>),
    Text(&'a mut dyn Keyed<String>),
    Dynamic(&'a mut dyn Keyed<Value>),
}

impl<'a> MapSlot<'a> {
    /// Split map shapes off from everything else.
    pub(crate) fn from_slot(slot: Slot<'a>) -> Result<Self, Slot<'a>> {
        match slot {
            Slot::BoolMap(map) => Ok(Self::Bool(map)),
            Slot::Set(set) => Ok(Self::Set(set)),
            Slot::StringMap(map) => Ok(Self::Text(map)),
            Slot::DynamicMap(map) => Ok(Self::Dynamic(map)),
            other => Err(other),
        }
    }

    /// Store entry `name` with `values` into the map bound to `key`.
    pub(crate) fn put(&mut self, key: &str, name: &str, values: &[String]) -> Result<(), Error> {
        match self {
            Self::Bool(map) => {
                let flag = values.first().map_or(true, |v| parse_bool(v));
                map.put(name.to_string(), flag);
            }
            Self::Set(set) => {
                set.put(name.to_string(), ());
                for member in values {
                    set.put(member.clone(), ());
                }
            }
            Self::Text(map) => {
                let value = first_value(key, name, values)?;
                map.put(name.to_string(), value.to_string());
            }
            Self::Dynamic(map) => {
                let value = first_value(key, name, values)?;
                map.put(name.to_string(), Value::String(value.to_string()));
            }
        }
        Ok(())
    }
}

fn first_value<'v>(key: &str, name: &str, values: &'v [String]) -> Result<&'v str, Error> {
    values
        .first()
        .map(String::as_str)
        .ok_or_else(|| Error::ValueExpected {
            key: key.to_string(),
            name: name.to_string(),
        })
}
