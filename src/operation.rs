//! Single-purpose pipeline stages.
//!
//! An [`Operation`] takes one item and returns an [`Outcome`]: the item is
//! kept (possibly transformed), dropped from the stream, or expanded into a
//! lazy sequence of items that the [`Pipeline`](crate::pipeline::Pipeline)
//! splices into its output in place.

use std::fmt;
use std::iter;

use crate::error::Result;

/// Lazy, finite, one-pass sequence of items produced by a fan-out stage.
pub type ItemStream<T> = Box<dyn Iterator<Item = Result<T>>>;

/// Result of applying an operation to one item.
///
/// `Dropped` is an explicit marker: a legitimately null value is
/// `Kept(PlainData::Null)`, never `Dropped`.
pub enum Outcome<T> {
    /// The item continues down the pipeline.
    Kept(T),
    /// The item is removed from the stream; later stages never see it.
    Dropped,
    /// The item is replaced by zero or more items, in order.
    Many(ItemStream<T>),
}

impl<T> Outcome<T> {
    /// Build a fan-out outcome from any iterator of items.
    pub fn many<I>(items: I) -> Self
    where
        T: 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Outcome::Many(Box::new(items.into_iter().map(Ok)))
    }

    /// True if the outcome drops the item.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Outcome::Dropped)
    }

    /// Turn the outcome into a stream of zero, one or many items.
    pub fn into_stream(self) -> ItemStream<T>
    where
        T: 'static,
    {
        match self {
            Outcome::Kept(item) => Box::new(iter::once(Ok(item))),
            Outcome::Dropped => Box::new(iter::empty()),
            Outcome::Many(items) => items,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Kept(item) => f.debug_tuple("Kept").field(item).finish(),
            Outcome::Dropped => write!(f, "Dropped"),
            Outcome::Many(_) => write!(f, "Many(..)"),
        }
    }
}

/// A transform-or-drop pipeline stage.
///
/// Operations are expected to be stateless across items: the pipeline may
/// call [`apply`](Self::apply) once per item and never re-inspects items.
/// An error aborts the whole run.
pub trait Operation<T>: fmt::Debug {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Apply the operation to one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be transformed. The pipeline
    /// propagates it to the caller and stops.
    fn apply(&self, item: T) -> Result<Outcome<T>>;
}

/// Operation backed by a closure.
///
/// # Examples
///
/// ```
/// use docalist_data::operation::{FnOperation, Operation, Outcome};
///
/// let double = FnOperation::new("double", |n: i32| Ok(Outcome::Kept(n * 2)));
/// assert!(matches!(double.apply(21), Ok(Outcome::Kept(42))));
/// ```
pub struct FnOperation<F> {
    name: String,
    f: F,
}

impl<F> FnOperation<F> {
    /// Wrap a closure as a named operation.
    pub fn new<T>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(T) -> Result<Outcome<T>>,
    {
        FnOperation {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnOperation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T, F> Operation<T> for FnOperation<F>
where
    F: Fn(T) -> Result<Outcome<T>>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, item: T) -> Result<Outcome<T>> {
        (self.f)(item)
    }
}
