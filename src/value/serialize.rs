//! `serde` support for values and promise states.
//!
//! Serialization is one-way: functions have no data representation and
//! accessor properties are skipped, since reading them would run code.

use std::cell::RefCell;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use super::Value;
use crate::promise::{Promise, PromiseState};

thread_local! {
    /// Ids of the promises currently being serialized on this thread.
    static IN_PROGRESS: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Serializes a promise's state, or `"[circular]"` if the promise is
/// already being serialized further up, e.g. when fulfilled with itself.
fn serialize_promise<S: Serializer>(promise: &Promise, serializer: S) -> Result<S::Ok, S::Error> {
    let id = promise.id();
    if IN_PROGRESS.with_borrow(|ids| ids.contains(&id)) {
        return serializer.serialize_str("[circular]");
    }
    IN_PROGRESS.with_borrow_mut(|ids| ids.push(id));
    let result = promise.state().serialize(serializer);
    IN_PROGRESS.with_borrow_mut(|ids| ids.pop());
    result
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null => serializer.serialize_none(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(number) => serializer.serialize_f64(*number),
            Self::String(string) => serializer.serialize_str(string),
            Self::Error(error) => serializer.collect_str(error),
            Self::Object(object) => {
                let entries = object.entries();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in &entries {
                    map.serialize_entry(&**key, value)?;
                }
                map.end()
            }
            Self::Function(_) => serializer.serialize_str("[function]"),
            Self::Promise(promise) => serialize_promise(promise, serializer),
        }
    }
}

impl Serialize for PromiseState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PromiseState", 2)?;
        state.serialize_field("state", self.name())?;
        match self {
            Self::Pending => state.skip_field("value")?,
            Self::Fulfilled(value) => state.serialize_field("value", value)?,
            Self::Rejected(reason) => state.serialize_field("reason", reason)?,
        }
        state.end()
    }
}
