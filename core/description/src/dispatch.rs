// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Invocation entry points of operations.
//!
//! Arguments and results cross the dispatcher as type-erased [`Value`]s: the
//! dispatcher decodes them with the operation's codecs and the handler takes
//! them back out with their concrete type.

use std::any::{Any, type_name};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::errors::InvokeError;

/// Type-erased argument or result value
pub type Value = Box<dyn Any + Send>;

/// Decoded input values, in wire order.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.push(Box::new(value));
        self
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(Some(value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Move the argument at `index` out as a `T`
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, InvokeError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(InvokeError::MissingArgument(index))?;
        let value = slot.take().ok_or(InvokeError::MissingArgument(index))?;

        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                // put it back so a retry with the right type still works
                *slot = Some(value);
                Err(InvokeError::ArgumentType {
                    index,
                    expected: type_name::<T>(),
                })
            }
        }
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments {
            values: values.into_iter().map(Some).collect(),
        }
    }
}

/// Values produced by a completed invocation.
#[derive(Debug, Default)]
pub struct Outcome {
    result: Option<Value>,
    out_values: Vec<Value>,
}

impl Outcome {
    /// Completion without a return value
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn returning<T: Any + Send>(value: T) -> Self {
        Outcome {
            result: Some(Box::new(value)),
            out_values: Vec::new(),
        }
    }

    /// Append the value of the next output parameter
    pub fn with_out<T: Any + Send>(mut self, value: T) -> Self {
        self.out_values.push(Box::new(value));
        self
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    pub fn take_result<T: Any>(&mut self) -> Result<T, InvokeError> {
        let value = self
            .result
            .take()
            .ok_or(InvokeError::ResultType(type_name::<T>()))?;

        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                self.result = Some(value);
                Err(InvokeError::ResultType(type_name::<T>()))
            }
        }
    }

    pub fn out_values(&self) -> &[Value] {
        &self.out_values
    }

    pub fn into_parts(self) -> (Option<Value>, Vec<Value>) {
        (self.result, self.out_values)
    }
}

/// Result of calling a [`DispatchTarget`].
pub enum Invocation {
    Ready(Result<Outcome, InvokeError>),
    Deferred(BoxFuture<'static, Result<Outcome, InvokeError>>),
}

impl Invocation {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Invocation::Deferred(_))
    }

    /// Wait for the eventual outcome
    pub async fn resolve(self) -> Result<Outcome, InvokeError> {
        match self {
            Invocation::Ready(outcome) => outcome,
            Invocation::Deferred(future) => future.await,
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Ready(outcome) => f.debug_tuple("Ready").field(outcome).finish(),
            Invocation::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

type DirectHandler = Arc<dyn Fn(Arguments) -> Result<Outcome, InvokeError> + Send + Sync>;

type DeferredHandler =
    Arc<dyn Fn(Arguments) -> BoxFuture<'static, Result<Outcome, InvokeError>> + Send + Sync>;

/// Opaque entry point of an operation.
#[derive(Clone)]
pub enum DispatchTarget {
    /// Returns its result immediately
    Direct(DirectHandler),
    /// Returns a future resolving to the result
    Deferred(DeferredHandler),
}

impl DispatchTarget {
    pub fn direct<F>(handler: F) -> Self
    where
        F: Fn(Arguments) -> Result<Outcome, InvokeError> + Send + Sync + 'static,
    {
        DispatchTarget::Direct(Arc::new(handler))
    }

    pub fn deferred<F, Fut>(handler: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, InvokeError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        DispatchTarget::Deferred(Arc::new(move |args: Arguments| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler(args).await })
                as BoxFuture<'static, Result<Outcome, InvokeError>>
        }))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, DispatchTarget::Deferred(_))
    }

    pub fn invoke(&self, args: Arguments) -> Invocation {
        match self {
            DispatchTarget::Direct(handler) => Invocation::Ready(handler(args)),
            DispatchTarget::Deferred(handler) => Invocation::Deferred(handler(args)),
        }
    }
}

impl fmt::Debug for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchTarget::Direct(_) => f.write_str("DispatchTarget::Direct"),
            DispatchTarget::Deferred(_) => f.write_str("DispatchTarget::Deferred"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_arguments() {
        let mut args = Arguments::new().with("hello".to_string()).with(3u32);
        assert_eq!(args.len(), 2);

        assert_eq!(
            args.take::<u64>(1),
            Err(InvokeError::ArgumentType {
                index: 1,
                expected: "u64",
            })
        );
        assert_eq!(args.take::<u32>(1), Ok(3));
        assert_eq!(args.take::<u32>(1), Err(InvokeError::MissingArgument(1)));
        assert_eq!(args.take::<String>(0).unwrap(), "hello");
        assert_eq!(args.take::<String>(5), Err(InvokeError::MissingArgument(5)));
    }

    #[test]
    fn test_outcome() {
        let mut outcome = Outcome::returning(7i32).with_out("x".to_string());
        assert!(outcome.has_result());
        assert_eq!(outcome.out_values().len(), 1);
        assert!(outcome.take_result::<String>().is_err());
        assert_eq!(outcome.take_result::<i32>(), Ok(7));
        assert!(!outcome.has_result());
    }

    #[test]
    fn test_direct_target() {
        let target = DispatchTarget::direct(|mut args| {
            let n: i32 = args.take(0)?;
            Ok(Outcome::returning(n * 2))
        });
        assert!(!target.is_deferred());

        let invocation = target.invoke(Arguments::new().with(21i32));
        assert!(!invocation.is_deferred());

        let mut outcome = futures::executor::block_on(invocation.resolve()).unwrap();
        assert_eq!(outcome.take_result::<i32>(), Ok(42));
    }

    #[test]
    fn test_deferred_target() {
        let target = DispatchTarget::deferred(|mut args| async move {
            let s: String = args.take(0)?;
            Ok::<_, InvokeError>(Outcome::returning(s.len()))
        });
        assert!(target.is_deferred());

        let invocation = target.invoke(Arguments::new().with("four".to_string()));
        assert!(invocation.is_deferred());

        let mut outcome = futures::executor::block_on(invocation.resolve()).unwrap();
        assert_eq!(outcome.take_result::<usize>(), Ok(4));
    }
}
