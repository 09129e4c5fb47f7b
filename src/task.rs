//! Cancellable handles for in-flight loads.
//!
//! Every asynchronous operation in the pipeline hands its caller a
//! [`LoaderTask`]. The caller owns it and cancels it once it stops caring about
//! the result (a row scrolled away, a view was closed). Delivery of the result
//! goes through a [`CompletionSlot`], which guarantees that the caller's
//! callback runs at most once and never after `cancel()` has been observed.

use parking_lot::Mutex;
use std::sync::Arc;

/// A boxed completion callback. Invoked at most once with the terminal outcome.
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Handle to one in-flight asynchronous operation.
pub trait LoaderTask: Send + Sync {
  /// Stop caring about the result.
  ///
  /// Implementations forward the request to whatever is doing the work (an
  /// HTTP request, a store read) when that is possible, and always suppress
  /// any later delivery. Calling it more than once has no further effect.
  fn cancel(&self);
}

/// Holds a completion callback until it is either delivered or discarded.
///
/// Taking the callback out of the slot is the single serialization point
/// between delivery and cancellation: whichever side takes it first wins.
pub struct CompletionSlot<T> {
  completion: Mutex<Option<Completion<T>>>,
}

impl<T> CompletionSlot<T> {
  pub fn new(completion: Completion<T>) -> Self {
    Self {
      completion: Mutex::new(Some(completion)),
    }
  }

  /// Convenience for the common `Arc<CompletionSlot>` shape shared between a
  /// task handle and the callback that eventually fires.
  pub fn shared<F>(completion: F) -> Arc<Self>
  where
    F: FnOnce(T) + Send + 'static,
  {
    Arc::new(Self::new(Box::new(completion)))
  }

  /// Deliver `value` if nobody has delivered or cancelled yet.
  ///
  /// Returns whether the callback actually ran.
  pub fn complete(&self, value: T) -> bool {
    // Lock is released before invoking, so a callback may cancel its own task.
    let completion = self.completion.lock().take();
    match completion {
      Some(completion) => {
        completion(value);
        true
      }
      None => false,
    }
  }

  /// Drop the callback without invoking it.
  ///
  /// Returns whether a callback was still pending, i.e. whether this call is
  /// the one that actually cancelled.
  pub fn prevent_further_completions(&self) -> bool {
    self.completion.lock().take().is_some()
  }

  /// Whether the callback is still waiting to be delivered.
  pub fn is_pending(&self) -> bool {
    self.completion.lock().is_some()
  }
}

/// A task whose only job is to suppress delivery once cancelled.
///
/// Used where the underlying work cannot be aborted mid-flight (store reads).
pub struct SuppressingTask<T> {
  slot: Arc<CompletionSlot<T>>,
}

impl<T> SuppressingTask<T> {
  pub fn new(slot: Arc<CompletionSlot<T>>) -> Self {
    Self { slot }
  }
}

impl<T: Send> LoaderTask for SuppressingTask<T> {
  fn cancel(&self) {
    let _ = self.slot.prevent_further_completions();
  }
}

/// A task with nothing to cancel.
pub struct NoopTask;

impl LoaderTask for NoopTask {
  fn cancel(&self) {}
}
