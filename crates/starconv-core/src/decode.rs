//! Decoder: populates Rust values from dynamic script values.
//!
//! Decoding writes into an existing destination rather than constructing a
//! fresh one, so a partial source only overwrites what it mentions:
//!
//! - **Records** take fields from a dict or a struct; fields missing from the
//!   source keep their current value.
//! - **`None` into containers** (`Vec`, arrays, maps, records, `Box`) is a
//!   no-op. `None` into an `Option` clears it.
//! - **Scalars** need the exact variant: an `int` does not decode into `f64`.
//!   Integers narrow by truncation, without range checks.
//! - **`Vec` and maps** are built aside and swapped in whole, so a failing
//!   element leaves the destination as it was. Arrays are written in place
//!   once the length has been checked.
//!
//! # Example
//! ```
//! use starconv_core::{decode_value, DecodeOptions, Value};
//!
//! let list = Value::List(vec![Value::from(1i64), Value::from(2i64)]);
//! let mut dst: Vec<u8> = Vec::new();
//! decode_value(&list, &mut dst, &DecodeOptions::new()).unwrap();
//! assert_eq!(dst, vec![1, 2]);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use num_bigint::BigInt;

use crate::context::DecodeContext;
use crate::error::{ErrorKind, Result};
use crate::options::DecodeOptions;
use crate::value::{low_bits, Value};

/// A destination that can be populated from a dynamic value.
pub trait Decode {
    /// Decode `value` into `self`. The value hook has already run; nested
    /// values should go through [`DecodeContext::decode`] so it runs for them
    /// too.
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()>;
}

/// Decode `value` into `dst`.
///
/// Returns the first error found in a depth-first, declaration-order walk;
/// its path names the offending location.
pub fn decode_value<T>(value: &Value, dst: &mut T, options: &DecodeOptions) -> Result<()>
where
    T: Decode + ?Sized,
{
    let span = tracing::debug_span!("decode", prefix = %options.prefix());
    let _enter = span.enter();

    let result = DecodeContext::new(options).decode(value, dst);
    if let Err(err) = &result {
        tracing::debug!(error = %err, "decode failed");
    }
    result
}

impl Decode for bool {
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        match value {
            Value::Bool(b) => {
                *self = *b;
                Ok(())
            }
            other => Err(ctx.mismatch("bool", other)),
        }
    }
}

impl Decode for String {
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        match value {
            Value::String(s) => {
                self.clone_from(s);
                Ok(())
            }
            other => Err(ctx.mismatch("string", other)),
        }
    }
}

macro_rules! decode_int {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
                    match value {
                        Value::Int(i) => {
                            *self = low_bits(i) as $t;
                            Ok(())
                        }
                        other => Err(ctx.mismatch("int", other)),
                    }
                }
            }
        )*
    };
}

decode_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Decode for BigInt {
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        match value {
            Value::Int(i) => {
                self.clone_from(i);
                Ok(())
            }
            other => Err(ctx.mismatch("int", other)),
        }
    }
}

impl Decode for f64 {
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        match value {
            Value::Float(f) => {
                *self = *f;
                Ok(())
            }
            other => Err(ctx.mismatch("float", other)),
        }
    }
}

impl Decode for f32 {
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        match value {
            Value::Float(f) => {
                *self = *f as f32;
                Ok(())
            }
            other => Err(ctx.mismatch("float", other)),
        }
    }
}

/// Any value is accepted as-is.
impl Decode for Value {
    fn decode_from(&mut self, value: &Value, _ctx: &DecodeContext<'_>) -> Result<()> {
        self.clone_from(value);
        Ok(())
    }
}

/// A re-bindable slot: `None` clears it, anything else fills it, allocating
/// a default inner value first when empty. The pointee goes through the
/// value hook again.
impl<T> Decode for Option<T>
where
    T: Decode + Default,
{
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        ctx.decode(value, self.get_or_insert_with(T::default))
    }
}

/// A fixed pointee: `None` leaves it alone. Like `Option`, the pointee goes
/// through the value hook again.
impl<T> Decode for Box<T>
where
    T: Decode + ?Sized,
{
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        ctx.decode(value, &mut **self)
    }
}

impl<T> Decode for Vec<T>
where
    T: Decode + Default,
{
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        let items = match value {
            Value::Null => return Ok(()),
            Value::List(items) => items,
            other => return Err(ctx.mismatch("list", other)),
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let mut slot = T::default();
            ctx.index(i).decode(item, &mut slot)?;
            out.push(slot);
        }

        *self = out;
        Ok(())
    }
}

impl<T, const N: usize> Decode for [T; N]
where
    T: Decode,
{
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        let items = match value {
            Value::Null => return Ok(()),
            Value::List(items) => items,
            other => return Err(ctx.mismatch("list", other)),
        };

        if items.len() != N {
            return Err(ctx.error(ErrorKind::LengthMismatch {
                expected: N,
                found: items.len(),
            }));
        }

        for (i, (item, slot)) in items.iter().zip(self.iter_mut()).enumerate() {
            ctx.index(i).decode(item, slot)?;
        }
        Ok(())
    }
}

/// Shared walk for map destinations: fresh default key and value per entry.
fn decode_entries<K, V, F>(value: &Value, ctx: &DecodeContext<'_>, mut insert: F) -> Result<bool>
where
    K: Decode + Default,
    V: Decode + Default,
    F: FnMut(K, V),
{
    let dict = match value {
        Value::Null => return Ok(false),
        Value::Dict(d) => d,
        other => return Err(ctx.mismatch("dict", other)),
    };

    for (k, v) in dict.iter() {
        let text = k.key_text().unwrap_or_else(|| k.to_string());
        let entry_ctx = ctx.key(&text);

        let mut key = K::default();
        entry_ctx.decode(k, &mut key)?;
        let mut val = V::default();
        entry_ctx.decode(v, &mut val)?;

        insert(key, val);
    }
    Ok(true)
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Default + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher + Default,
{
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        let mut out = HashMap::with_hasher(S::default());
        if decode_entries(value, ctx, |k, v| {
            out.insert(k, v);
        })? {
            *self = out;
        }
        Ok(())
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Default + Ord,
    V: Decode + Default,
{
    fn decode_from(&mut self, value: &Value, ctx: &DecodeContext<'_>) -> Result<()> {
        let mut out = BTreeMap::new();
        if decode_entries(value, ctx, |k, v| {
            out.insert(k, v);
        })? {
            *self = out;
        }
        Ok(())
    }
}
