//! Symbols: named brands that double as struct constructors.
//!
//! A symbol is a distinct value that constructs "branded" struct instances,
//! like a class in Python or a provider in Bazel. Calling `point(x = 1, y = 2)`
//! where `point` is a symbol yields a struct whose brand is `point`.
//!
//! Symbols are deliberately unhashable. [`Symbol`] has no `std::hash::Hash`
//! impl, and [`Symbol::hash`] always fails, so a symbol can never become a
//! dict key.

use std::fmt;

use crate::error::{ErrorKind, Result};
use crate::value::{Builtin, Struct, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol(String);

impl Symbol {
    pub const TYPE_NAME: &'static str = "symbol";

    /// The name is kept verbatim, including case.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn truth(&self) -> bool {
        true
    }

    pub fn hash(&self) -> Result<u64> {
        Err(ErrorKind::Unhashable {
            type_name: Self::TYPE_NAME,
        }
        .into())
    }

    /// Construct a struct branded with this symbol from keyword arguments.
    /// Fields keep the caller's order.
    pub fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> Result<Value> {
        if !args.is_empty() {
            return Err(ErrorKind::InvocationArity {
                name: self.0.clone(),
                count: args.len(),
            }
            .into());
        }
        Ok(Value::Struct(Struct::new(self.clone(), kwargs.iter().cloned())))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

/// The `symbol(name)` builtin scripts use to mint new symbols.
///
/// Accepts exactly one string argument, positionally or as `name = ...`.
pub fn symbol_builtin() -> Builtin {
    Builtin::new("symbol", |args, kwargs| {
        let name = unpack_name(args, kwargs)?;
        Ok(Value::from(Symbol::new(name)))
    })
}

fn unpack_name(args: &[Value], kwargs: &[(String, Value)]) -> Result<String> {
    if args.len() > 1 {
        return Err(argument_error(format!(
            "got {} arguments, want at most 1",
            args.len()
        )));
    }
    let mut name = args.first();
    for (key, value) in kwargs {
        if key != "name" {
            return Err(argument_error(format!("unexpected keyword argument {key}")));
        }
        if name.is_some() {
            return Err(argument_error("got multiple values for parameter name".to_string()));
        }
        name = Some(value);
    }
    match name {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(argument_error(format!(
            "for parameter name: got {}, want string",
            other.type_name()
        ))),
        None => Err(argument_error("missing argument for name".to_string())),
    }
}

fn argument_error(message: String) -> crate::Error {
    ErrorKind::Argument(format!("symbol: {message}")).into()
}
