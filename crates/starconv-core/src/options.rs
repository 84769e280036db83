//! Conversion options.
//!
//! Both directions take an immutable options record. Defaults: empty path
//! prefix, snake_case name conversion, no value hook.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use heck::ToSnakeCase;

use crate::error::BoxError;
use crate::value::Value;

/// Maps a Rust field identifier or type name to its script-side name.
#[derive(Clone)]
pub struct NameConverter(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl NameConverter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Keep names exactly as written.
    pub fn identity() -> Self {
        Self::new(str::to_string)
    }

    pub fn convert(&self, name: &str) -> String {
        (self.0)(name)
    }
}

impl Default for NameConverter {
    /// `TestStruct` -> `test_struct`, `retryCount` -> `retry_count`.
    fn default() -> Self {
        Self::new(|name| name.to_snake_case())
    }
}

impl fmt::Debug for NameConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NameConverter")
    }
}

pub type DecodeHook = Arc<dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync>;
pub type EncodeHook = Arc<dyn Fn(&dyn Any) -> Result<Option<Value>, BoxError> + Send + Sync>;

/// Options for [`decode_value`](crate::decode_value).
#[derive(Clone, Default)]
pub struct DecodeOptions {
    pub(crate) prefix: String,
    pub(crate) name_converter: NameConverter,
    pub(crate) value_hook: Option<DecodeHook>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text prepended to every error path.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_name_converter(mut self, converter: NameConverter) -> Self {
        self.name_converter = converter;
        self
    }

    /// Hook applied to every value before it is interpreted. It may
    /// substitute a different value or reject it.
    pub fn with_value_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.value_hook = Some(Arc::new(hook));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name_converter(&self) -> &NameConverter {
        &self.name_converter
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("prefix", &self.prefix)
            .field("value_hook", &self.value_hook.is_some())
            .finish()
    }
}

/// Options for [`encode_value`](crate::encode_value).
#[derive(Clone, Default)]
pub struct EncodeOptions {
    pub(crate) prefix: String,
    pub(crate) name_converter: NameConverter,
    pub(crate) value_hook: Option<EncodeHook>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_name_converter(mut self, converter: NameConverter) -> Self {
        self.name_converter = converter;
        self
    }

    /// Hook applied to every source before it is interpreted, parents before
    /// their children. Returning `Some` replaces the source's encoding and
    /// skips its subtree; `None` lets encoding proceed. Sources are offered
    /// by [`Encode::as_any`](crate::Encode::as_any), so downcast to inspect
    /// them.
    pub fn with_value_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Any) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        self.value_hook = Some(Arc::new(hook));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name_converter(&self) -> &NameConverter {
        &self.name_converter
    }
}

impl fmt::Debug for EncodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("prefix", &self.prefix)
            .field("value_hook", &self.value_hook.is_some())
            .finish()
    }
}
