//! Callable values.

use std::fmt;
use std::rc::Rc;

use super::Value;
use super::object::{Properties, Property};

type Callable = dyn Fn(&Value, &[Value]) -> Result<Value, Value>;

struct FunctionInner {
    call: Box<Callable>,
    properties: Properties,
}

/// A shared callable value.
///
/// A function receives a receiver (`this`) and a slice of arguments and
/// either returns a value or raises one through `Err`. Like an [`Object`],
/// a function carries its own property table, so a function can itself be
/// a thenable.
///
/// Cloning produces another handle to the same function; equality is
/// identity.
///
/// [`Object`]: super::Object
///
/// # Examples
///
/// ```rust
/// use aplus::value::{Function, Value};
///
/// let double = Function::unary(|value| match value {
///     Value::Number(number) => Ok(Value::from(number * 2.0)),
///     other => Err(other),
/// });
///
/// assert_eq!(double.call(&Value::Undefined, &[Value::from(21)]), Ok(Value::from(42)));
/// ```
#[derive(Clone)]
pub struct Function {
    inner: Rc<FunctionInner>,
}

impl Function {
    /// Creates a function from a closure taking the receiver and arguments.
    pub fn new<F>(call: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, Value> + 'static,
    {
        Self {
            inner: Rc::new(FunctionInner {
                call: Box::new(call),
                properties: Properties::default(),
            }),
        }
    }

    /// Creates a function that only looks at its first argument.
    ///
    /// A missing argument is passed as [`Value::Undefined`].
    pub fn unary<F>(call: F) -> Self
    where
        F: Fn(Value) -> Result<Value, Value> + 'static,
    {
        Self::new(move |_, arguments| call(arguments.first().cloned().unwrap_or_default()))
    }

    /// Invokes the function.
    ///
    /// # Errors
    ///
    /// Returns whatever value the function raised.
    pub fn call(&self, receiver: &Value, arguments: &[Value]) -> Result<Value, Value> {
        (self.inner.call)(receiver, arguments)
    }

    /// Builder form of [`Function::set`].
    #[must_use]
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Stores a data property on the function.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.inner.properties.define(key, Property::Data(value.into()));
    }

    /// Installs an accessor property on the function.
    pub fn define_getter<G>(&self, key: &str, getter: G)
    where
        G: Fn(&Value) -> Result<Value, Value> + 'static,
    {
        self.inner
            .properties
            .define(key, Property::Accessor(Rc::new(getter)));
    }

    /// Reads a property of the function.
    ///
    /// # Errors
    ///
    /// Returns the value raised by an accessor's getter.
    pub fn get(&self, key: &str) -> Result<Value, Value> {
        self.inner
            .properties
            .get(key, &Value::Function(self.clone()))
    }

    /// Returns `true` if both handles refer to the same function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Function({:p})", Rc::as_ptr(&self.inner))
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
