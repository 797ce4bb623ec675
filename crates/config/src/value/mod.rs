//! Type-erased option cells
//!
//! Every option kind implements [`Kind`]: a grammar for parsing text and a canonical
//! rendering that parses back to an equal value. [`bind`] turns a typed [`Handle`] into a
//! boxed [`Value`], which is all the registry and the resolution pass ever see.
//!
//! Scalars parse from raw text. Sequences (`Vec<T>`) always parse from a JSON array,
//! whatever source the text came from.

mod collection;
mod net;
mod scalar;

use crate::error::ValueError;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

pub use collection::Map;

/// Settable, self-describing cell bound to one option's storage
pub trait Value: Send + Sync {
    /// Parse `text` and store the result in the bound storage
    fn set(&mut self, text: &str) -> Result<(), ValueError>;

    /// Stable lowercase type tag, pluralized for sequences (`"bool"`, `"bools"`)
    fn type_name(&self) -> &'static str;

    /// Canonical text of the current value; `set(to_text())` is a no-op
    fn to_text(&self) -> String;
}

mod sealed {
    pub trait Sealed {}
}

pub(crate) use sealed::Sealed;

/// Closed set of option kinds the registry can hold
pub trait Kind: Sealed + Clone + Send + Sync + 'static {
    const TYPE: &'static str;

    fn parse(text: &str) -> Result<Self, ValueError>;

    fn render(&self) -> String;

    /// Value used when a declaration gives no default
    fn zero() -> Self;
}

/// Kinds that can appear as elements of a sequence option
pub trait Element: Kind {
    const SEQ_TYPE: &'static str;

    fn from_json(value: &serde_json::Value) -> Result<Self, ValueError>;

    fn to_json(&self) -> serde_json::Value;
}

impl<T: Element> Sealed for Vec<T> {}

impl<T: Element> Kind for Vec<T> {
    const TYPE: &'static str = T::SEQ_TYPE;

    fn parse(text: &str) -> Result<Self, ValueError> {
        let items: Option<Vec<serde_json::Value>> = serde_json::from_str(text)
            .map_err(|e| ValueError::new(T::SEQ_TYPE, text, e))?;
        items
            .unwrap_or_default()
            .iter()
            .map(T::from_json)
            .collect()
    }

    fn render(&self) -> String {
        serde_json::Value::Array(self.iter().map(Element::to_json).collect()).to_string()
    }

    fn zero() -> Self {
        Vec::new()
    }
}

/// Shared reference to an option's storage
///
/// Returned by declarations; read it after the resolution pass succeeded.
pub struct Handle<T>(Arc<RwLock<T>>);

impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Borrow the current value
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn replace(&self, value: T) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

impl<T: Clone> Handle<T> {
    /// Clone the current value out of the cell
    pub fn get(&self) -> T {
        self.read().clone()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&*self.read()).finish()
    }
}

struct Cell<T: Kind> {
    target: Handle<T>,
}

impl<T: Kind> Value for Cell<T> {
    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        let parsed = T::parse(text)?;
        self.target.replace(parsed);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        T::TYPE
    }

    fn to_text(&self) -> String {
        self.target.read().render()
    }
}

/// Initialize `target` to `default` and return a [`Value`] bound to it
pub fn bind<T: Kind>(default: T, target: Handle<T>) -> Box<dyn Value> {
    target.replace(default);
    Box::new(Cell { target })
}
