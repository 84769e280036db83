//! Record glue between Rust structs and dict/struct values.
//!
//! `#[derive(Record)]` implements [`Record`] together with
//! [`Decode`](crate::Decode) and [`Encode`](crate::Encode). Only `pub` fields
//! take part. A field marked `#[starconv(embed)]` has its own record members
//! promoted into the parent, and `#[starconv(skip)]` hides a public field.
//! A promoted member is shadowed by a field of the same name declared
//! closer to the outer record, so the outer field alone is read and written.
//!
//! ```
//! use starconv_core::{decode_value, encode_value, DecodeOptions, EncodeOptions, Record, Value};
//!
//! #[derive(Debug, Default, PartialEq, Record)]
//! pub struct Endpoint {
//!     pub host: String,
//!     pub port: u16,
//! }
//!
//! let ep = Endpoint { host: "localhost".into(), port: 8080 };
//! let value = encode_value(&ep, &EncodeOptions::new()).unwrap();
//! assert_eq!(value.to_string(), r#"endpoint(host = "localhost", port = 8080)"#);
//!
//! let mut back = Endpoint::default();
//! decode_value(&value, &mut back, &DecodeOptions::new()).unwrap();
//! assert_eq!(back, ep);
//! ```

use crate::context::{DecodeContext, EncodeContext};
use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::Result;
use crate::symbol::Symbol;
use crate::value::{Dict, Struct, Value};

/// A struct whose exported fields map to named dynamic fields.
pub trait Record {
    /// The Rust type name; the brand is this name run through the name
    /// converter.
    const TYPE_NAME: &'static str;

    /// Decode every exported field present in `source`, in declaration order.
    /// Fields named in `hidden` belong to an enclosing record and are skipped.
    fn decode_fields(
        &mut self,
        source: &FieldSource<'_>,
        hidden: &[&str],
        ctx: &DecodeContext<'_>,
    ) -> Result<()>;

    /// Encode every exported field into `out`, in declaration order, except
    /// those named in `hidden`.
    fn encode_fields(
        &self,
        out: &mut Struct,
        hidden: &[&str],
        ctx: &EncodeContext<'_>,
    ) -> Result<()>;
}

/// Where record fields are read from during decode.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource<'v> {
    Dict(&'v Dict),
    Struct(&'v Struct),
}

impl<'v> FieldSource<'v> {
    pub fn get(&self, name: &str) -> Option<&'v Value> {
        match self {
            FieldSource::Dict(d) => d.get_str(name),
            FieldSource::Struct(s) => s.attr(name),
        }
    }
}

/// Decode one field. Absent fields are left untouched.
pub fn decode_field<T>(
    source: &FieldSource<'_>,
    ident: &str,
    dst: &mut T,
    ctx: &DecodeContext<'_>,
) -> Result<()>
where
    T: Decode + ?Sized,
{
    let name = ctx.convert_name(ident);
    match source.get(&name) {
        Some(value) => ctx.field(ident).decode(value, dst),
        None => Ok(()),
    }
}

/// Encode one field under its converted name.
pub fn encode_field<T>(
    out: &mut Struct,
    ident: &str,
    src: &T,
    ctx: &EncodeContext<'_>,
) -> Result<()>
where
    T: Encode + ?Sized,
{
    let value = ctx.field(ident).encode(src)?;
    out.set(ctx.convert_name(ident), value);
    Ok(())
}

/// `Decode` body for records: `None` is a no-op, dicts and structs supply
/// fields, anything else is a type mismatch.
pub fn decode_record<R>(dst: &mut R, value: &Value, ctx: &DecodeContext<'_>) -> Result<()>
where
    R: Record,
{
    let source = match value {
        Value::Null => return Ok(()),
        Value::Dict(d) => FieldSource::Dict(d),
        Value::Struct(s) => FieldSource::Struct(s),
        other => return Err(ctx.mismatch("dict or struct", other)),
    };
    dst.decode_fields(&source, &[], ctx)
}

/// `Encode` body for records: a struct branded with the converted type name.
pub fn encode_record<R>(src: &R, ctx: &EncodeContext<'_>) -> Result<Value>
where
    R: Record,
{
    let brand = Symbol::new(ctx.convert_name(R::TYPE_NAME));
    let mut out = Struct::new(brand, std::iter::empty());
    src.encode_fields(&mut out, &[], ctx)?;
    Ok(Value::Struct(out))
}
