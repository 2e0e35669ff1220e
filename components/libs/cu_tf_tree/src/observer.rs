//! Synchronous fan-out of committed updates.
//!
//! Observers run one after the other on the updating thread. A panicking
//! observer is logged and skipped: it stays registered and neither the other
//! observers nor the update that triggered it are affected.

use crate::error::{TfError, TfResult};
use crate::types::{StampedIsometry, TransformType};
use log::{debug, error};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Anything that wants to hear about every committed transform.
pub trait BufferObserver: Send + Sync {
    fn on_update(&self, from: &str, to: &str, transform: &StampedIsometry, kind: TransformType);
}

impl<F> BufferObserver for F
where
    F: Fn(&str, &str, &StampedIsometry, TransformType) + Send + Sync,
{
    fn on_update(&self, from: &str, to: &str, transform: &StampedIsometry, kind: TransformType) {
        self(from, to, transform, kind)
    }
}

/// Type erased observer as handed over by code that cannot name the trait
/// statically, see `ObserverHub::register_any`.
pub type BoxedObserver = Box<dyn BufferObserver>;

#[derive(Default)]
pub struct ObserverHub {
    observers: Vec<BoxedObserver>,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non string panic payload"
    }
}

fn dispatch(
    observer: &dyn BufferObserver,
    from: &str,
    to: &str,
    transform: &StampedIsometry,
    kind: TransformType,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        observer.on_update(from, to, transform, kind)
    }));
    if let Err(payload) = outcome {
        error!(
            "Observer failed on '{from}' -> '{to}' at {}: {}",
            transform.stamp(),
            panic_message(payload.as_ref())
        );
    }
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Add an observer and replay `history` to it before returning.
    pub fn register<'h, I>(&mut self, observer: BoxedObserver, history: I)
    where
        I: IntoIterator<Item = (&'h str, &'h str, &'h StampedIsometry, TransformType)>,
    {
        self.observers.push(observer);
        let Some(newcomer) = self.observers.last() else {
            return;
        };
        let mut replayed = 0usize;
        for (from, to, transform, kind) in history {
            dispatch(newcomer.as_ref(), from, to, transform, kind);
            replayed += 1;
        }
        debug!(
            "Observer #{} registered, replayed {replayed} samples",
            self.observers.len()
        );
    }

    /// Same as `register` for a value of unknown type.
    ///
    /// Only a `BoxedObserver` is accepted, anything else is rejected with
    /// `ObserverNotCallable` and leaves the registry untouched.
    pub fn register_any<'h, I>(
        &mut self,
        candidate: Box<dyn Any + Send + Sync>,
        history: I,
    ) -> TfResult<()>
    where
        I: IntoIterator<Item = (&'h str, &'h str, &'h StampedIsometry, TransformType)>,
    {
        let observer = candidate
            .downcast::<BoxedObserver>()
            .map_err(|_| TfError::ObserverNotCallable)?;
        self.register(*observer, history);
        Ok(())
    }

    /// Call every observer in registration order.
    pub fn notify(&self, from: &str, to: &str, transform: &StampedIsometry, kind: TransformType) {
        for observer in &self.observers {
            dispatch(observer.as_ref(), from, to, transform, kind);
        }
    }
}
