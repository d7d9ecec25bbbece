//! Records: structs whose fields are bound by config keys.

use std::any::{type_name, TypeId};

use crate::convert::Convert;
use crate::field::Slot;

/// A struct that config lines can be bound into.
///
/// Usually implemented with [`record!`](crate::record), which also implements
/// [`Field`](crate::Field) so the record can be nested in another one.
pub trait Record: 'static {
    /// The bindable fields, in declaration order.
    fn fields(&self) -> Vec<FieldSpec>;

    /// Borrow the field with the given Rust name.
    fn field_mut(&mut self, name: &str) -> Option<Slot<'_>>;

    fn record_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn record_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Declaration of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Rust field name.
    pub name: &'static str,
    /// Config key override; defaults to the field name.
    pub key: Option<&'static str>,
    /// Conversion hint for integer fields.
    pub convert: Option<Convert>,
    /// Promote the nested record's keys into this record.
    pub embedded: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            key: None,
            convert: None,
            embedded: false,
        }
    }

    pub fn key(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    pub fn convert(mut self, convert: Convert) -> Self {
        self.convert = Some(convert);
        self
    }

    pub fn embed(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// The config key this field answers to (lowercased).
    pub fn config_key(&self) -> String {
        self.key.unwrap_or(self.name).to_lowercase()
    }
}

/// Implement [`Record`] and [`Field`](crate::Field) for a struct.
///
/// Each listed field may carry [`FieldSpec`] builder calls after `=>`:
///
/// ```
/// use std::collections::HashMap;
/// use accfg::Convert;
///
/// #[derive(Debug, Default)]
/// struct Common {
///     name: String,
/// }
/// accfg::record!(Common { name });
///
/// #[derive(Debug, Default)]
/// struct Server {
///     common: Common,
///     port: u16,
///     banner: String,
///     expire: i64,
///     header: HashMap<String, String>,
/// }
/// accfg::record!(Server {
///     common => embed(),
///     port,
///     banner => key("motd"),
///     expire => convert(Convert::Duration),
///     header,
/// });
///
/// let text = "name edge\nport 8080\nmotd: \"hello\\tworld\"\nexpire 2d\nheader accept json\n";
/// let mut server = Server::default();
/// accfg::read_from(text.as_bytes(), &mut server).unwrap();
///
/// assert_eq!(server.common.name, "edge");
/// assert_eq!(server.port, 8080);
/// assert_eq!(server.banner, "hello\tworld");
/// assert_eq!(server.expire, 2 * 86400);
/// assert_eq!(server.header["accept"], "json");
/// ```
#[macro_export]
macro_rules! record {
    ($name:ident { $($field:ident $(=> $($option:ident($($arg:expr),*)).+)?),* $(,)? }) => {
        impl $crate::Record for $name {
            fn fields(&self) -> ::std::vec::Vec<$crate::FieldSpec> {
                ::std::vec![$(
                    $crate::FieldSpec::new(::core::stringify!($field))$($(.$option($($arg),*))+)?
                ),*]
            }

            fn field_mut(&mut self, name: &str) -> ::core::option::Option<$crate::Slot<'_>> {
                match name {
                    $(::core::stringify!($field) => {
                        ::core::option::Option::Some($crate::Field::slot(&mut self.$field))
                    })*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl $crate::Field for $name {
            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Record(self)
            }
        }
    };
}
