//! Ordered composition of operations applied lazily to a stream of items.
//!
//! Each item flows through every stage in registration order. A stage that
//! drops an item short-circuits the remaining stages for that item; a stage
//! that fans out has its items spliced into the output in place, each one
//! continuing from the next stage.
//!
//! Processing is pull-based: [`Pipeline::process`] returns an iterator and
//! nothing happens until it is consumed. The first error is yielded to the
//! caller and the iterator then ends.
//!
//! # Examples
//!
//! ```
//! use docalist_data::operation::{FnOperation, Outcome};
//! use docalist_data::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.append(FnOperation::new("odd-only", |n: i32| {
//!     Ok(if n % 2 == 1 { Outcome::Kept(n) } else { Outcome::Dropped })
//! }));
//! pipeline.append(FnOperation::new("square", |n: i32| Ok(Outcome::Kept(n * n))));
//!
//! let out: Vec<i32> = pipeline
//!     .process(1..=5)
//!     .collect::<docalist_data::Result<_>>()?;
//! assert_eq!(out, vec![1, 9, 25]);
//! # Ok::<(), docalist_data::DataError>(())
//! ```

use std::fmt;

use crate::error::{DataError, Result};
use crate::operation::{ItemStream, Operation, Outcome};

/// One registered stage.
struct Stage<T> {
    key: Option<String>,
    operation: Box<dyn Operation<T>>,
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("key", &self.key)
            .field("operation", &self.operation)
            .finish()
    }
}

/// Ordered sequence of [`Operation`]s.
///
/// Stages can be registered with a key so that a caller can later locate or
/// replace one stage without rebuilding the chain.
pub struct Pipeline<T> {
    stages: Vec<Stage<T>>,
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .finish()
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pipeline<T> {
    /// Create an empty pipeline. An empty pipeline passes items through.
    #[must_use]
    pub fn new() -> Self {
        Pipeline { stages: Vec::new() }
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Append an unkeyed stage.
    pub fn append(&mut self, operation: impl Operation<T> + 'static) -> &mut Self {
        self.stages.push(Stage {
            key: None,
            operation: Box::new(operation),
        });
        self
    }

    /// Prepend an unkeyed stage.
    pub fn prepend(&mut self, operation: impl Operation<T> + 'static) -> &mut Self {
        self.stages.insert(
            0,
            Stage {
                key: None,
                operation: Box::new(operation),
            },
        );
        self
    }

    /// Append a stage under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if `key` is already used.
    pub fn append_keyed(
        &mut self,
        key: impl Into<String>,
        operation: impl Operation<T> + 'static,
    ) -> Result<&mut Self> {
        let key = self.unused_key(key.into())?;
        self.stages.push(Stage {
            key: Some(key),
            operation: Box::new(operation),
        });
        Ok(self)
    }

    /// Append a stage under `key` unless a stage already has that key.
    ///
    /// Returns `true` if the stage was added.
    pub fn append_keyed_if_absent(
        &mut self,
        key: impl Into<String>,
        operation: impl Operation<T> + 'static,
    ) -> bool {
        let key = key.into();
        if self.position(&key).is_some() {
            return false;
        }
        self.stages.push(Stage {
            key: Some(key),
            operation: Box::new(operation),
        });
        true
    }

    /// Prepend a stage under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if `key` is already used.
    pub fn prepend_keyed(
        &mut self,
        key: impl Into<String>,
        operation: impl Operation<T> + 'static,
    ) -> Result<&mut Self> {
        let key = self.unused_key(key.into())?;
        self.stages.insert(
            0,
            Stage {
                key: Some(key),
                operation: Box::new(operation),
            },
        );
        Ok(self)
    }

    /// Get the stage registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn Operation<T>> {
        self.position(key)
            .map(|index| self.stages[index].operation.as_ref())
    }

    /// Replace the stage registered under `key`, keeping its position.
    ///
    /// Returns the operation that was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfiguration`] if no stage has that key.
    pub fn replace(
        &mut self,
        key: &str,
        operation: impl Operation<T> + 'static,
    ) -> Result<Box<dyn Operation<T>>> {
        let index = self.position(key).ok_or_else(|| {
            DataError::InvalidConfiguration(format!("no pipeline stage with key '{key}'"))
        })?;
        Ok(std::mem::replace(
            &mut self.stages[index].operation,
            Box::new(operation),
        ))
    }

    /// Keys of the keyed stages, in pipeline order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().filter_map(|stage| stage.key.as_deref())
    }

    /// Names of all stages, in pipeline order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|stage| stage.operation.name())
    }

    /// Lazily run every item of `items` through the pipeline.
    pub fn process<I>(&self, items: I) -> Process<'_, T, std::iter::Map<I::IntoIter, fn(T) -> Result<T>>>
    where
        I: IntoIterator<Item = T>,
    {
        self.process_results(items.into_iter().map(Ok as fn(T) -> Result<T>))
    }

    /// Lazily run a fallible stream through the pipeline.
    ///
    /// An `Err` in the input is yielded as-is and ends the run.
    pub fn process_results<I>(&self, items: I) -> Process<'_, T, I::IntoIter>
    where
        I: IntoIterator<Item = Result<T>>,
    {
        Process {
            stages: &self.stages,
            input: items.into_iter(),
            pending: Vec::new(),
            done: false,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.stages
            .iter()
            .position(|stage| stage.key.as_deref() == Some(key))
    }

    fn unused_key(&self, key: String) -> Result<String> {
        if self.position(&key).is_some() {
            return Err(DataError::InvalidConfiguration(format!(
                "duplicate pipeline stage key '{key}'"
            )));
        }
        Ok(key)
    }
}

/// Lazy iterator returned by [`Pipeline::process`].
///
/// Not restartable: it consumes its input once.
pub struct Process<'p, T, I> {
    stages: &'p [Stage<T>],
    input: I,
    /// Fan-out streams still being drained, with the stage their items start at.
    /// The last entry is the most recent fan-out and is drained first.
    pending: Vec<(usize, ItemStream<T>)>,
    done: bool,
}

impl<T, I> fmt::Debug for Process<'_, T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("stages", &self.stages.len())
            .field("pending", &self.pending.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T, I> Process<'_, T, I>
where
    I: Iterator<Item = Result<T>>,
{
    /// Next raw item and the stage it starts at.
    fn next_source(&mut self) -> Option<Result<(T, usize)>> {
        while let Some((start, stream)) = self.pending.last_mut() {
            let start = *start;
            match stream.next() {
                Some(item) => return Some(item.map(|item| (item, start))),
                None => {
                    self.pending.pop();
                },
            }
        }
        self.input.next().map(|item| item.map(|item| (item, 0)))
    }

    /// Run `item` from stage `start`. `None` means dropped or fanned out.
    fn run(&mut self, mut item: T, start: usize) -> Result<Option<T>> {
        for (index, stage) in self.stages.iter().enumerate().skip(start) {
            match stage.operation.apply(item)? {
                Outcome::Kept(next) => item = next,
                Outcome::Dropped => return Ok(None),
                Outcome::Many(stream) => {
                    self.pending.push((index + 1, stream));
                    return Ok(None);
                },
            }
        }
        Ok(Some(item))
    }
}

impl<T, I> Iterator for Process<'_, T, I>
where
    I: Iterator<Item = Result<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let result = match self.next_source()? {
                Ok((item, start)) => self.run(item, start),
                Err(e) => Err(e),
            };
            match result {
                Ok(Some(item)) => return Some(Ok(item)),
                Ok(None) => {},
                Err(e) => {
                    self.done = true;
                    self.pending.clear();
                    return Some(Err(e));
                },
            }
        }
    }
}
