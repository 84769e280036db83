//! Per-call conversion state: the options in force and the current path.
//!
//! A context is never mutated. Descending into a list element, map entry or
//! record field produces a new context whose path has one more segment, so an
//! error raised deep in the graph already names its full location.

use std::borrow::Cow;

use crate::decode::Decode;
use crate::encode::Encode;
use crate::error::{Error, ErrorKind, Result};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct DecodeContext<'a> {
    options: &'a DecodeOptions,
    path: String,
}

impl<'a> DecodeContext<'a> {
    pub fn new(options: &'a DecodeOptions) -> Self {
        Self {
            options,
            path: options.prefix.clone(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn index(&self, index: usize) -> Self {
        self.descend(format!("[{index}]"))
    }

    pub fn key(&self, key: &str) -> Self {
        self.descend(format!("[{key:?}]"))
    }

    pub fn field(&self, name: &str) -> Self {
        self.descend(format!(".{name}"))
    }

    fn descend(&self, segment: String) -> Self {
        Self {
            options: self.options,
            path: self.path.clone() + &segment,
        }
    }

    pub fn convert_name(&self, name: &str) -> String {
        self.options.name_converter.convert(name)
    }

    /// Run the value hook, then decode into `dst`.
    pub fn decode<T>(&self, value: &Value, dst: &mut T) -> Result<()>
    where
        T: Decode + ?Sized,
    {
        let value = self.apply_hook(value)?;
        dst.decode_from(&value, self)
    }

    fn apply_hook<'v>(&self, value: &'v Value) -> Result<Cow<'v, Value>> {
        match &self.options.value_hook {
            Some(hook) => hook(value)
                .map(Cow::Owned)
                .map_err(|e| self.error(ErrorKind::Hook(e))),
            None => Ok(Cow::Borrowed(value)),
        }
    }

    pub fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.path.clone(), kind)
    }

    pub fn mismatch(&self, expected: &'static str, found: &Value) -> Error {
        self.error(ErrorKind::TypeMismatch {
            expected,
            found: found.type_name(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EncodeContext<'a> {
    options: &'a EncodeOptions,
    path: String,
}

impl<'a> EncodeContext<'a> {
    pub fn new(options: &'a EncodeOptions) -> Self {
        Self {
            options,
            path: options.prefix.clone(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn index(&self, index: usize) -> Self {
        self.descend(format!("[{index}]"))
    }

    pub fn key(&self, key: &str) -> Self {
        self.descend(format!("[{key:?}]"))
    }

    pub fn field(&self, name: &str) -> Self {
        self.descend(format!(".{name}"))
    }

    fn descend(&self, segment: String) -> Self {
        Self {
            options: self.options,
            path: self.path.clone() + &segment,
        }
    }

    pub fn convert_name(&self, name: &str) -> String {
        self.options.name_converter.convert(name)
    }

    /// Offer `src` to the value hook, then encode it unless the hook
    /// supplied a replacement.
    pub fn encode<T>(&self, src: &T) -> Result<Value>
    where
        T: Encode + ?Sized,
    {
        if let (Some(hook), Some(source)) = (&self.options.value_hook, src.as_any()) {
            if let Some(replacement) = hook(source).map_err(|e| self.error(ErrorKind::Hook(e)))? {
                return Ok(replacement);
            }
        }
        src.encode(self)
    }

    pub fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.path.clone(), kind)
    }
}
