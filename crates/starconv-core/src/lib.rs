//! # starconv-core
//!
//! Bidirectional conversion between the dynamic values of an embedded
//! Starlark-style scripting runtime and statically-typed Rust data.
//!
//! Scripts produce dicts, lists and branded structs; the host wants its own
//! structs, `Vec`s and maps. `decode_value` walks a destination's type and
//! fills it from a dynamic value, `encode_value` walks a source and builds
//! the dynamic value, with no per-type conversion code beyond
//! `#[derive(Record)]`.
//!
//! ## Quick start
//!
//! ```rust
//! use starconv_core::{decode_value, encode_value, DecodeOptions, EncodeOptions, Record};
//!
//! #[derive(Debug, Default, Clone, PartialEq, Record)]
//! pub struct Job {
//!     pub name: String,
//!     pub retries: u32,
//!     pub tags: Vec<String>,
//! }
//!
//! let job = Job { name: "build".into(), retries: 3, tags: vec!["ci".into()] };
//! let value = encode_value(&job, &EncodeOptions::new()).unwrap();
//!
//! let mut back = Job::default();
//! decode_value(&value, &mut back, &DecodeOptions::new()).unwrap();
//! assert_eq!(back, job);
//! ```
//!
//! ## Modules
//!
//! - [`value`] - the dynamic value model (`Value`, `Dict`, `Struct`, callables)
//! - [`symbol`] - `Symbol` brands and the `symbol(name)` builtin
//! - [`decode`] - dynamic value → Rust destination
//! - [`encode`] - Rust source → dynamic value
//! - [`record`] - struct glue used by `#[derive(Record)]`
//! - [`options`] / [`context`] - conversion configuration and per-call state
//! - [`json`] - `serde_json` interop
//! - [`error`] - path-qualified errors

extern crate self as starconv_core;

pub mod context;
pub mod decode;
pub mod encode;
pub mod error;
pub mod json;
pub mod options;
pub mod record;
pub mod symbol;
pub mod value;

pub use context::{DecodeContext, EncodeContext};
pub use decode::{decode_value, Decode};
pub use encode::{encode_value, Encode};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use options::{DecodeOptions, EncodeOptions, NameConverter};
pub use record::{FieldSource, Record};
pub use starconv_derive::Record;
pub use symbol::{symbol_builtin, Symbol};
pub use value::{Builtin, Callable, Dict, Struct, Value};
