//! Encoder: exposes Rust values to scripts as dynamic values.
//!
//! - Every integer width becomes an arbitrary-width `int`; `f32` widens to
//!   `float`.
//! - `None`, `()` and empty pointers become `None`; `Some`, `Box` and
//!   references encode their pointee at the same path. The value hook sees
//!   both the pointer and its pointee.
//! - Sequences become lists with order preserved.
//! - Maps become dicts whose keys are the natural text of the encoded key.
//!   Non-string keys therefore come back as strings; this is lossy on
//!   purpose. Aggregate keys are rejected.
//! - Records become structs branded with the converted type name.
//!
//! The value hook runs on the source before it is interpreted, so a parent
//! is always offered before its children.
//!
//! # Example
//! ```
//! use starconv_core::{encode_value, EncodeOptions, Value};
//!
//! let value = encode_value(&vec![Some(1u8), None], &EncodeOptions::new()).unwrap();
//! assert_eq!(value, Value::List(vec![Value::from(1i64), Value::Null]));
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use num_bigint::BigInt;

use crate::context::EncodeContext;
use crate::error::{ErrorKind, Result};
use crate::options::EncodeOptions;
use crate::value::{Dict, Value};

/// A source that can be turned into a dynamic value.
pub trait Encode {
    /// Produce the value for `self`. Nested values should go through
    /// [`EncodeContext::encode`] so the value hook runs for them.
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value>;

    /// The source as offered to the value hook. Unsized sources (`str`,
    /// slices) return `None` and are not offered.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// Encode `src` into a dynamic value.
pub fn encode_value<T>(src: &T, options: &EncodeOptions) -> Result<Value>
where
    T: Encode + ?Sized,
{
    let span = tracing::debug_span!("encode", prefix = %options.prefix());
    let _enter = span.enter();

    let result = EncodeContext::new(options).encode(src);
    if let Err(err) = &result {
        tracing::debug!(error = %err, "encode failed");
    }
    result
}

/// The untyped absence.
impl Encode for () {
    fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
        Ok(Value::Null)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Encode for bool {
    fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
        Ok(Value::Bool(*self))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Encode for str {
    fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl Encode for String {
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        self.as_str().encode(ctx)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

macro_rules! encode_int {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
                    Ok(Value::Int(BigInt::from(*self)))
                }

                fn as_any(&self) -> Option<&dyn Any> {
                    Some(self)
                }
            }
        )*
    };
}

encode_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Encode for BigInt {
    fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
        Ok(Value::Int(self.clone()))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Encode for f64 {
    fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
        Ok(Value::Float(*self))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Encode for f32 {
    fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
        Ok(Value::Float(f64::from(*self)))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Encode for Value {
    fn encode(&self, _ctx: &EncodeContext<'_>) -> Result<Value> {
        Ok(self.clone())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl<T> Encode for Option<T>
where
    T: Encode + 'static,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        match self {
            Some(inner) => ctx.encode(inner),
            None => Ok(Value::Null),
        }
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl<T> Encode for Box<T>
where
    T: Encode + ?Sized + 'static,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        ctx.encode(&**self)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// References are transparent: the hook is offered the referent.
impl<T> Encode for &T
where
    T: Encode + ?Sized,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        (**self).encode(ctx)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        (**self).as_any()
    }
}

impl<T> Encode for [T]
where
    T: Encode,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        let items = self
            .iter()
            .enumerate()
            .map(|(i, item)| ctx.index(i).encode(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::List(items))
    }
}

impl<T, const N: usize> Encode for [T; N]
where
    T: Encode + 'static,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        self.as_slice().encode(ctx)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl<T> Encode for Vec<T>
where
    T: Encode + 'static,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        self.as_slice().encode(ctx)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// Shared walk for map sources. Keys are encoded (without the value hook)
/// and replaced by their text.
fn encode_entries<'m, K, V, I>(entries: I, len: usize, ctx: &EncodeContext<'_>) -> Result<Value>
where
    K: Encode + 'm,
    V: Encode + 'm,
    I: Iterator<Item = (&'m K, &'m V)>,
{
    let mut dict = Dict::with_capacity(len);
    for (k, v) in entries {
        let key = k.encode(ctx)?;
        let text = match key.key_text() {
            Some(text) => text,
            None => {
                return Err(ctx.error(ErrorKind::UnsupportedShape(format!(
                    "{} map key",
                    key.type_name()
                ))))
            }
        };
        if !matches!(key, Value::String(_)) {
            tracing::trace!(key = %text, from = key.type_name(), "stringified map key");
        }

        let value = ctx.key(&text).encode(v)?;
        dict.insert(Value::String(text), value)
            .map_err(|e| ctx.error(e.into_kind()))?;
    }
    Ok(Value::Dict(dict))
}

impl<K, V, S> Encode for HashMap<K, V, S>
where
    K: Encode + 'static,
    V: Encode + 'static,
    S: 'static,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        encode_entries(self.iter(), self.len(), ctx)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl<K, V> Encode for BTreeMap<K, V>
where
    K: Encode + 'static,
    V: Encode + 'static,
{
    fn encode(&self, ctx: &EncodeContext<'_>) -> Result<Value> {
        encode_entries(self.iter(), self.len(), ctx)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}
