//! Dynamic values flowing through promise chains.
//!
//! Promise/A+ lets any value be a fulfillment value or a rejection reason,
//! and decides whether a returned value must be unwrapped by inspecting it
//! at runtime. [`Value`] is that inspection made explicit: a tagged variant
//! over primitives, engine errors, foreign [`Object`]s, callable
//! [`Function`]s and native [`Promise`]s.
//!
//! - [`Value`]: the tagged variant
//! - [`Object`]: a foreign object with data and accessor properties
//! - [`Function`]: a callable value with its own properties
//! - [`Thenable`]: the outcome of looking up a value's `then` member
//!
//! # Examples
//!
//! ```rust
//! use aplus::value::{Function, Object, Thenable, Value};
//!
//! let plain = Value::from(1);
//! assert!(matches!(plain.thenable(), Ok(Thenable::Terminal)));
//!
//! let foreign = Value::from(Object::new().with("then", Function::unary(Ok)));
//! assert!(matches!(foreign.thenable(), Ok(Thenable::Foreign(_))));
//! ```

mod function;
mod object;
#[cfg(feature = "serde")]
mod serialize;

pub use function::Function;
pub use object::{Getter, Object, Property};

use std::fmt;
use std::rc::Rc;

use crate::error::PromiseError;
use crate::promise::Promise;

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Undefined,
    /// An explicit empty value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// An immutable shared string.
    String(Rc<str>),
    /// An error created by the engine or by [`Value::error`].
    Error(Rc<PromiseError>),
    /// A foreign object.
    Object(Object),
    /// A callable value.
    Function(Function),
    /// A native promise.
    Promise(Promise),
}

/// Result of inspecting a value's `then` member.
pub enum Thenable {
    /// A native promise, adopted without a member lookup.
    Native(Promise),
    /// A foreign object or function whose `then` member is callable.
    Foreign(Function),
    /// Anything else: the value is used as is.
    Terminal,
}

impl Value {
    /// Creates a [`PromiseError::Custom`] error value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aplus::value::Value;
    ///
    /// let error = Value::error("boom");
    /// assert_eq!(error.to_string(), "boom");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::from(PromiseError::Custom(message.into()))
    }

    /// Looks up the `then` member of an object or function.
    ///
    /// Native promises are reported without running any lookup. Values that
    /// are neither objects nor functions are terminal.
    ///
    /// # Errors
    ///
    /// Returns the value raised while reading `then`.
    pub fn thenable(&self) -> Result<Thenable, Self> {
        let then = match self {
            Self::Promise(promise) => return Ok(Thenable::Native(promise.clone())),
            Self::Object(object) => object.get("then")?,
            Self::Function(function) => function.get("then")?,
            _ => return Ok(Thenable::Terminal),
        };
        Ok(match then {
            Self::Function(then) => Thenable::Foreign(then),
            _ => Thenable::Terminal,
        })
    }

    /// Returns `true` for [`Value::Undefined`].
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for callable values.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(&**string),
            _ => None,
        }
    }

    /// Returns the engine error, if this is one.
    #[must_use]
    pub fn as_error(&self) -> Option<&PromiseError> {
        match self {
            Self::Error(error) => Some(&**error),
            _ => None,
        }
    }

    /// Returns the object, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the function, if this is one.
    #[must_use]
    pub const fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Returns the promise, if this is one.
    #[must_use]
    pub const fn as_promise(&self) -> Option<&Promise> {
        match self {
            Self::Promise(promise) => Some(promise),
            _ => None,
        }
    }

    /// Compares two values: primitives and errors by content, objects,
    /// functions and promises by identity.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => {
                left == right || (left.is_nan() && right.is_nan())
            }
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Error(left), Self::Error(right)) => left == right,
            (Self::Object(left), Self::Object(right)) => left.ptr_eq(right),
            (Self::Function(left), Self::Function(right)) => left.ptr_eq(right),
            (Self::Promise(left), Self::Promise(right)) => left.ptr_eq(right),
            _ => false,
        }
    }

    /// Name of the variant, as used in log events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Error(_) => "error",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Promise(_) => "promise",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => formatter.write_str("Undefined"),
            Self::Null => formatter.write_str("Null"),
            Self::Bool(value) => formatter.debug_tuple("Bool").field(value).finish(),
            Self::Number(number) => formatter.debug_tuple("Number").field(number).finish(),
            Self::String(string) => formatter.debug_tuple("String").field(string).finish(),
            Self::Error(error) => formatter.debug_tuple("Error").field(error).finish(),
            Self::Object(object) => formatter.debug_tuple("Object").field(object).finish(),
            Self::Function(function) => fmt::Debug::fmt(function, formatter),
            Self::Promise(promise) => promise.fmt_summary(formatter),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => formatter.write_str("undefined"),
            Self::Null => formatter.write_str("null"),
            Self::Bool(value) => write!(formatter, "{value}"),
            Self::Number(number) => write!(formatter, "{number}"),
            Self::String(string) => formatter.write_str(string),
            Self::Error(error) => write!(formatter, "{error}"),
            Self::Object(_) => formatter.write_str("[object Object]"),
            Self::Function(_) => formatter.write_str("[function]"),
            Self::Promise(promise) => write!(formatter, "[promise {}]", promise.state().name()),
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(Rc::from(value))
    }
}

impl From<PromiseError> for Value {
    fn from(error: PromiseError) -> Self {
        Self::Error(Rc::new(error))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Self::Promise(promise)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}
