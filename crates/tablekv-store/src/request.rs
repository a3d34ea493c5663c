//! Store primitives.

use tablekv_common::types::{Key, KeyValue, Value};

/// A single primitive operation sent to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Reads the value at `key`.
    Get {
        /// Key to read.
        key: Key,
    },
    /// Writes `value` at `key`.
    Put {
        /// Key to write.
        key: Key,
        /// Value to write.
        value: Value,
    },
    /// Writes `value` at `key` if the current value equals `expected`.
    ConditionalPut {
        /// Key to write.
        key: Key,
        /// Value to write.
        value: Value,
        /// Required current value; `None` requires the key to be absent.
        expected: Option<Value>,
    },
    /// Adds `delta` to the integer at `key`.
    Increment {
        /// Key to increment.
        key: Key,
        /// Amount to add.
        delta: i64,
    },
    /// Reads the pairs in `[start, end)`.
    Scan {
        /// Inclusive start key.
        start: Key,
        /// Exclusive end key.
        end: Key,
        /// Maximum number of pairs returned; `0` means unlimited.
        max_rows: usize,
    },
    /// Removes `key`.
    Delete {
        /// Key to delete.
        key: Key,
    },
}

impl Request {
    /// Creates a get request.
    pub fn get(key: impl Into<Key>) -> Self {
        Self::Get { key: key.into() }
    }

    /// Creates a put request.
    pub fn put(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a conditional put request.
    pub fn conditional_put(
        key: impl Into<Key>,
        value: impl Into<Value>,
        expected: Option<Value>,
    ) -> Self {
        Self::ConditionalPut {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }

    /// Creates an increment request.
    pub fn increment(key: impl Into<Key>, delta: i64) -> Self {
        Self::Increment {
            key: key.into(),
            delta,
        }
    }

    /// Creates a scan request.
    pub fn scan(start: impl Into<Key>, end: impl Into<Key>, max_rows: usize) -> Self {
        Self::Scan {
            start: start.into(),
            end: end.into(),
            max_rows,
        }
    }

    /// Creates a delete request.
    pub fn delete(key: impl Into<Key>) -> Self {
        Self::Delete { key: key.into() }
    }

    /// Returns the method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Get { .. } => "Get",
            Self::Put { .. } => "Put",
            Self::ConditionalPut { .. } => "ConditionalPut",
            Self::Increment { .. } => "Increment",
            Self::Scan { .. } => "Scan",
            Self::Delete { .. } => "Delete",
        }
    }

    /// Returns true if the request modifies the store.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Get { .. } | Self::Scan { .. })
    }
}

/// The reply to a [`Request`], in the same position of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Value read, if present.
    Get(Option<Value>),
    /// Put applied.
    Put,
    /// Conditional put applied.
    ConditionalPut,
    /// New integer value after the increment.
    Increment(i64),
    /// Pairs read, in ascending key order.
    Scan(Vec<KeyValue>),
    /// Delete applied.
    Delete,
}

impl Response {
    /// Returns the method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Get(_) => "Get",
            Self::Put => "Put",
            Self::ConditionalPut => "ConditionalPut",
            Self::Increment(_) => "Increment",
            Self::Scan(_) => "Scan",
            Self::Delete => "Delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let req = Request::put("a", 5i64);
        assert_eq!(
            req,
            Request::Put {
                key: Key::from("a"),
                value: Value::Integer(5)
            }
        );
        assert_eq!(req.method(), "Put");
        assert!(req.is_write());

        assert!(!Request::get("a").is_write());
        assert!(!Request::scan("a", "b", 0).is_write());
        assert!(Request::delete("a").is_write());
        assert!(Request::increment("a", 1).is_write());
    }
}
