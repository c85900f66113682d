//! Foreign objects with data and accessor properties.
//!
//! An [`Object`] stands in for any value coming from outside the engine.
//! Whether it is a thenable is only known by reading its `then` member,
//! and that read may itself run arbitrary code through an accessor.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::Value;

/// A getter run when an accessor property is read.
///
/// Receives the object the property was read from. Returning `Err` models a
/// member read that raises.
pub type Getter = Rc<dyn Fn(&Value) -> Result<Value, Value>>;

/// A single entry of a property table.
#[derive(Clone)]
pub enum Property {
    /// A plain stored value.
    Data(Value),
    /// A computed value, produced by running the getter on every read.
    Accessor(Getter),
}

impl fmt::Debug for Property {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(value) => formatter.debug_tuple("Data").field(value).finish(),
            Self::Accessor(_) => formatter.write_str("Accessor(<getter>)"),
        }
    }
}

/// A property table shared by [`Object`] and [`Function`](super::Function).
#[derive(Default)]
pub(crate) struct Properties {
    entries: RefCell<FxHashMap<Rc<str>, Property>>,
}

impl Properties {
    pub(crate) fn define(&self, key: &str, property: Property) {
        self.entries.borrow_mut().insert(Rc::from(key), property);
    }

    /// Reads `key` with `receiver` as the getter's receiver.
    ///
    /// The table borrow is released before any getter runs, so getters may
    /// freely mutate the object they are defined on.
    pub(crate) fn get(&self, key: &str, receiver: &Value) -> Result<Value, Value> {
        let property = self.entries.borrow().get(key).cloned();
        match property {
            None => Ok(Value::Undefined),
            Some(Property::Data(value)) => Ok(value),
            Some(Property::Accessor(getter)) => getter(receiver),
        }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub(crate) fn remove(&self, key: &str) -> Option<Property> {
        self.entries.borrow_mut().remove(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Snapshot of the data properties, sorted by key.
    pub(crate) fn data_entries(&self) -> Vec<(Rc<str>, Value)> {
        let mut entries: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .filter_map(|(key, property)| match property {
                Property::Data(value) => Some((Rc::clone(key), value.clone())),
                Property::Accessor(_) => None,
            })
            .collect();
        entries.sort_by(|left, right| left.0.cmp(&right.0));
        entries
    }
}

/// A shared, mutable bag of properties.
///
/// Cloning an `Object` produces another handle to the same object; equality
/// is identity.
///
/// # Examples
///
/// ```rust
/// use aplus::value::{Object, Value};
///
/// let object = Object::new().with("answer", 42);
/// assert_eq!(object.get("answer"), Ok(Value::from(42)));
/// assert_eq!(object.get("missing"), Ok(Value::Undefined));
/// ```
#[derive(Clone, Default)]
pub struct Object {
    properties: Rc<Properties>,
}

impl Object {
    /// Creates an object without properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Object::set`].
    #[must_use]
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form of [`Object::define_getter`].
    #[must_use]
    pub fn with_getter<G>(self, key: &str, getter: G) -> Self
    where
        G: Fn(&Value) -> Result<Value, Value> + 'static,
    {
        self.define_getter(key, getter);
        self
    }

    /// Stores a data property, replacing whatever was under `key`.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.properties.define(key, Property::Data(value.into()));
    }

    /// Installs an accessor property whose getter runs on every read.
    pub fn define_getter<G>(&self, key: &str, getter: G)
    where
        G: Fn(&Value) -> Result<Value, Value> + 'static,
    {
        self.properties
            .define(key, Property::Accessor(Rc::new(getter)));
    }

    /// Reads a property. Missing keys read as [`Value::Undefined`].
    ///
    /// # Errors
    ///
    /// Returns the value raised by an accessor's getter.
    pub fn get(&self, key: &str) -> Result<Value, Value> {
        self.properties.get(key, &Value::Object(self.clone()))
    }

    /// Returns `true` if `key` is defined, without running any getter.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.properties.contains(key)
    }

    /// Removes a property and returns it.
    pub fn remove(&self, key: &str) -> Option<Property> {
        self.properties.remove(key)
    }

    /// Number of properties, data and accessor alike.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the object has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Data properties sorted by key. Accessors are skipped.
    #[must_use]
    pub fn entries(&self) -> Vec<(Rc<str>, Value)> {
        self.properties.data_entries()
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.properties, &other.properties)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_map()
            .entries(self.entries().into_iter())
            .finish()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
