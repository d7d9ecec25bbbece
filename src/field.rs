//! Bindable field types.
//!
//! Every field a config can reach implements [`Field`], which exposes the
//! field as a [`Slot`]: a typed mutable view tagged with the field's shape.
//! The binder dispatches on the slot variant instead of inspecting types at
//! runtime.

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::num::TryFromIntError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;

use crate::error::{BoxError, Error};
use crate::record::Record;

/// A type that config text can be bound into.
pub trait Field {
    /// Borrow this field as a typed slot.
    fn slot(&mut self) -> Slot<'_>;

    /// The record to fill when this value is one element of a repeated
    /// section (`thing { ... }` appearing several times).
    fn section_target(&mut self) -> Option<&mut dyn Record> {
        None
    }
}

/// A mutable view of one field, tagged by shape.
///
/// Variants are listed in dispatch precedence order.
pub enum Slot<'a> {
    /// Parsed with the type's own string parser.
    ParseStr(&'a mut dyn ParseStr),
    /// Parsed with the type's own byte parser.
    ParseBytes(&'a mut dyn ParseBytes),
    /// Unit-suffixed duration such as `1h30m`.
    Duration(&'a mut Duration),
    /// `key` declares true, `key <bool>` declares an explicit value.
    BoolMap(&'a mut dyn Keyed<bool>),
    /// Presence-only set; several members may be declared on one line.
    Set(&'a mut dyn Keyed<()>),
    /// `key value` pairs.
    StringMap(&'a mut dyn Keyed<String>),
    /// `key value` pairs stored as dynamic values.
    DynamicMap(&'a mut dyn Keyed<Value>),
    /// Appends one element per token.
    Sequence(&'a mut dyn Sequence),
    Text(&'a mut String),
    Integer(&'a mut dyn Integer),
    Float(&'a mut dyn Float),
    Bool(&'a mut bool),
    /// Nested record, filled from a `{ }` section.
    Record(&'a mut dyn Record),
    /// A type that has no config binding; carries the type name.
    Unsupported(&'static str),
}

impl Slot<'_> {
    pub fn shape(&self) -> Shape {
        match self {
            Self::ParseStr(target) => Shape::Custom(target.type_name()),
            Self::ParseBytes(target) => Shape::Custom(target.type_name()),
            Self::Duration(_) => Shape::Duration,
            Self::BoolMap(_) => Shape::BoolMap,
            Self::Set(_) => Shape::Set,
            Self::StringMap(_) => Shape::StringMap,
            Self::DynamicMap(_) => Shape::DynamicMap,
            Self::Sequence(_) => Shape::Sequence,
            Self::Text(_) => Shape::Text,
            Self::Integer(_) => Shape::Integer,
            Self::Float(_) => Shape::Float,
            Self::Bool(_) => Shape::Bool,
            Self::Record(record) => Shape::Record(record.record_name()),
            Self::Unsupported(name) => Shape::Unsupported(name),
        }
    }
}

/// The shape of a field without a borrow of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Custom(&'static str),
    Duration,
    BoolMap,
    Set,
    StringMap,
    DynamicMap,
    Sequence,
    Text,
    Integer,
    Float,
    Bool,
    Record(&'static str),
    Unsupported(&'static str),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(name) => write!(f, "{}", name),
            Self::Duration => write!(f, "duration"),
            Self::BoolMap => write!(f, "bool map"),
            Self::Set => write!(f, "set"),
            Self::StringMap => write!(f, "string map"),
            Self::DynamicMap => write!(f, "dynamic map"),
            Self::Sequence => write!(f, "sequence"),
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::Record(name) => write!(f, "record {}", name),
            Self::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// Types that replace themselves by parsing a string.
///
/// Implemented for every [`FromStr`] type whose error converts to
/// [`BoxError`]. Opt a type into binding with [`parse_str_field!`](crate::parse_str_field).
pub trait ParseStr {
    fn parse_str(&mut self, text: &str) -> Result<(), BoxError>;
    fn type_name(&self) -> &'static str;
}

impl<T> ParseStr for T
where
    T: FromStr,
    T::Err: Into<BoxError>,
{
    fn parse_str(&mut self, text: &str) -> Result<(), BoxError> {
        match text.parse::<T>() {
            Ok(value) => {
                *self = value;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Types that replace themselves by parsing raw token bytes.
pub trait ParseBytes {
    fn parse_bytes(&mut self, text: &[u8]) -> Result<(), BoxError>;

    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// String-keyed containers.
pub trait Keyed<V> {
    fn put(&mut self, key: String, value: V);
}

impl<V> Keyed<V> for HashMap<String, V> {
    fn put(&mut self, key: String, value: V) {
        self.insert(key, value);
    }
}

impl<V> Keyed<V> for BTreeMap<String, V> {
    fn put(&mut self, key: String, value: V) {
        self.insert(key, value);
    }
}

impl Keyed<()> for HashSet<String> {
    fn put(&mut self, key: String, _: ()) {
        self.insert(key);
    }
}

impl Keyed<()> for BTreeSet<String> {
    fn put(&mut self, key: String, _: ()) {
        self.insert(key);
    }
}

/// Value types a string-keyed map field may hold.
pub trait MapValue: Sized {
    fn map_slot<M: Keyed<Self>>(map: &mut M) -> Slot<'_>;
}

impl MapValue for bool {
    fn map_slot<M: Keyed<Self>>(map: &mut M) -> Slot<'_> {
        Slot::BoolMap(map)
    }
}

impl MapValue for () {
    fn map_slot<M: Keyed<Self>>(map: &mut M) -> Slot<'_> {
        Slot::Set(map)
    }
}

impl MapValue for String {
    fn map_slot<M: Keyed<Self>>(map: &mut M) -> Slot<'_> {
        Slot::StringMap(map)
    }
}

impl MapValue for Value {
    fn map_slot<M: Keyed<Self>>(map: &mut M) -> Slot<'_> {
        Slot::DynamicMap(map)
    }
}

// Maps of numbers have no text form; they resolve to an unsupported slot so
// the error names the offending line.
macro_rules! unsupported_map_values {
    ($($t:ty),*) => {
        $(
            impl MapValue for $t {
                fn map_slot<M: Keyed<Self>>(_: &mut M) -> Slot<'_> {
                    Slot::Unsupported(type_name::<M>())
                }
            }
        )*
    };
}

unsupported_map_values!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<V: MapValue> Field for HashMap<String, V> {
    fn slot(&mut self) -> Slot<'_> {
        V::map_slot(self)
    }
}

impl<V: MapValue> Field for BTreeMap<String, V> {
    fn slot(&mut self) -> Slot<'_> {
        V::map_slot(self)
    }
}

impl Field for HashSet<String> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Set(self)
    }
}

impl Field for BTreeSet<String> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Set(self)
    }
}

/// Growable sequences of bindable elements.
pub trait Sequence {
    /// Build a default element, let `fill` bind it, and append it only if
    /// binding succeeded.
    fn push_with(
        &mut self,
        fill: &mut dyn FnMut(Slot<'_>) -> Result<(), Error>,
    ) -> Result<(), Error>;

    /// Append a fresh record element and return it for filling, or `None`
    /// when elements are not boxed records.
    fn push_section(&mut self) -> Option<&mut dyn Record>;
}

impl<T: Field + Default> Sequence for Vec<T> {
    fn push_with(
        &mut self,
        fill: &mut dyn FnMut(Slot<'_>) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut item = T::default();
        fill(item.slot())?;
        self.push(item);
        Ok(())
    }

    fn push_section(&mut self) -> Option<&mut dyn Record> {
        let mut item = T::default();
        if item.section_target().is_none() {
            return None;
        }
        self.push(item);
        self.last_mut()?.section_target()
    }
}

impl<T: Field + Default> Field for Vec<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self)
    }
}

/// A boxed record is only bindable as an element of a repeated section.
impl<R: Record + Default> Field for Box<R> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Unsupported(type_name::<Self>())
    }

    fn section_target(&mut self) -> Option<&mut dyn Record> {
        Some(&mut **self)
    }
}

/// Integer fields, assigned from a parsed `i64` with a range check.
pub trait Integer {
    fn set_i64(&mut self, value: i64) -> Result<(), TryFromIntError>;
}

/// Floating point fields.
pub trait Float {
    fn set_f64(&mut self, value: f64);
}

macro_rules! integer_fields {
    ($($t:ty),*) => {
        $(
            impl Integer for $t {
                fn set_i64(&mut self, value: i64) -> Result<(), TryFromIntError> {
                    *self = <$t>::try_from(value)?;
                    Ok(())
                }
            }

            impl Field for $t {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::Integer(self)
                }
            }
        )*
    };
}

integer_fields!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Float for f64 {
    fn set_f64(&mut self, value: f64) {
        *self = value;
    }
}

impl Float for f32 {
    fn set_f64(&mut self, value: f64) {
        *self = value as f32;
    }
}

impl Field for f64 {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Float(self)
    }
}

impl Field for f32 {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Float(self)
    }
}

impl Field for String {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Text(self)
    }
}

impl Field for bool {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Bool(self)
    }
}

impl Field for Duration {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Duration(self)
    }
}

/// Implement [`Field`] for types that parse themselves with [`FromStr`].
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// struct Level(u8);
///
/// impl std::str::FromStr for Level {
///     type Err = std::num::ParseIntError;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.trim_start_matches('L').parse().map(Level)
///     }
/// }
///
/// accfg::parse_str_field!(Level);
/// ```
#[macro_export]
macro_rules! parse_str_field {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::Field for $t {
                fn slot(&mut self) -> $crate::Slot<'_> {
                    $crate::Slot::ParseStr(self)
                }
            }
        )+
    };
}

crate::parse_str_field!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, PathBuf);

impl ParseBytes for DateTime<Utc> {
    fn parse_bytes(&mut self, text: &[u8]) -> Result<(), BoxError> {
        let text = std::str::from_utf8(text)?;
        *self = DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc);
        Ok(())
    }
}

impl ParseBytes for DateTime<FixedOffset> {
    fn parse_bytes(&mut self, text: &[u8]) -> Result<(), BoxError> {
        let text = std::str::from_utf8(text)?;
        *self = DateTime::parse_from_rfc3339(text)?;
        Ok(())
    }
}

impl Field for DateTime<Utc> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::ParseBytes(self)
    }
}

impl Field for DateTime<FixedOffset> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::ParseBytes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        let mut text = String::new();
        let mut flags: HashMap<String, bool> = HashMap::new();
        let mut set: BTreeSet<String> = BTreeSet::new();
        let mut unit_map: HashMap<String, ()> = HashMap::new();
        let mut numbers: HashMap<String, i64> = HashMap::new();
        let mut list: Vec<u16> = Vec::new();
        let mut addr = IpAddr::from([127, 0, 0, 1]);
        let mut when = DateTime::<Utc>::default();

        assert_eq!(text.slot().shape(), Shape::Text);
        assert_eq!(flags.slot().shape(), Shape::BoolMap);
        assert_eq!(set.slot().shape(), Shape::Set);
        assert_eq!(unit_map.slot().shape(), Shape::Set);
        assert!(matches!(numbers.slot().shape(), Shape::Unsupported(_)));
        assert_eq!(list.slot().shape(), Shape::Sequence);
        assert!(matches!(addr.slot().shape(), Shape::Custom(name) if name.ends_with("IpAddr")));
        assert!(matches!(when.slot().shape(), Shape::Custom(name) if name.contains("DateTime")));
    }

    #[test]
    fn test_integer_range_check() {
        let mut small: i8 = 0;
        assert!(small.set_i64(127).is_ok());
        assert_eq!(small, 127);
        assert!(small.set_i64(128).is_err());
        assert_eq!(small, 127);

        let mut unsigned: u32 = 5;
        assert!(unsigned.set_i64(-1).is_err());
        assert_eq!(unsigned, 5);
    }

    #[test]
    fn test_push_with_skips_failed_element() {
        let mut list: Vec<i32> = vec![1];
        let result = list.push_with(&mut |_| Err(Error::InvalidParam("x".to_string())));
        assert!(result.is_err());
        assert_eq!(list, vec![1]);
    }

    #[test]
    fn test_push_section_requires_boxed_records() {
        let mut list: Vec<String> = Vec::new();
        assert!(list.push_section().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_parse_bytes_rfc3339() {
        let mut when = DateTime::<Utc>::default();
        when.parse_bytes(b"2024-01-01T02:03:04Z").unwrap();
        assert_eq!(when.timestamp(), 1_704_074_584);
        assert!(when.parse_bytes(b"yesterday").is_err());
    }

    #[test]
    fn test_parse_bytes_rfc3339_keeps_offset() {
        let mut when = DateTime::<FixedOffset>::default();
        when.parse_bytes(b"2024-01-01T04:03:04+02:00").unwrap();
        assert_eq!(when.timestamp(), 1_704_074_584);
        assert_eq!(when.offset().local_minus_utc(), 7200);
        let shape = when.slot().shape();
        assert!(matches!(shape, Shape::Custom(name) if name.contains("FixedOffset")));
        assert!(when.parse_bytes(b"2024-01-01 04:03:04").is_err());
    }
}
