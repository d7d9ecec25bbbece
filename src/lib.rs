//! accfg - schema-directed reader for AC-style config files
//!
//! A config file is a sequence of `key value [extra...]` lines, with `#`
//! comments, quoted tokens, `key {` ... `}` sections and `include` lines.
//! Lines are bound into a caller's record: each key names a field, and the
//! field's type decides how the text is converted.
//!
//! ```text
//! # server settings
//! port 8080
//! motd: "hello\tworld"
//! expire 30d
//! header accept json
//! backend {
//!     host 10.0.0.1
//! }
//! include local.conf
//! ```
//!
//! Records are declared with [`record!`]. Reading only assigns the fields
//! the file mentions, so defaults set before reading survive.

mod bind;
mod block;
pub mod convert;
pub mod error;
pub mod field;
pub mod include;
pub mod reader;
pub mod record;
pub mod schema;

use std::io::Read;
use std::path::Path;

pub use accfg_syntax::{Line, LineReader, SyntaxError};
pub use convert::{parse_bool, parse_duration, parse_duration_expr, parse_int, Convert, ConvertError};
pub use error::{BoxError, Error};
pub use field::{Field, Float, Integer, Keyed, MapValue, ParseBytes, ParseStr, Sequence, Shape, Slot};
pub use include::resolve_include;
pub use reader::{Reader, ReaderOptions};
pub use record::{FieldSpec, Record};
pub use schema::{FieldLocator, KeyMap, SchemaCache};

/// Read the config file at `path` into `target` with default options.
pub fn read<R: Record>(path: impl AsRef<Path>, target: &mut R) -> Result<(), Error> {
    Reader::new().read(path, target)
}

/// Read a config stream into `target` with default options.
pub fn read_from<I: Read, R: Record>(input: I, target: &mut R) -> Result<(), Error> {
    Reader::new().read_from(input, target)
}
