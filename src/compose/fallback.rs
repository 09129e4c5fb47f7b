use parking_lot::Mutex;
use std::sync::Arc;
use url::Url;

use crate::beer::{BeerImageDataLoader, ImageDataResult};
use crate::task::{Completion, CompletionSlot, LoaderTask};

/// Tries `primary` first and only goes to `fallback` when it fails.
///
/// Any primary failure counts, including a plain cache miss.
pub struct BeerImageDataLoaderWithFallbackComposite<P, F> {
  primary: P,
  fallback: Arc<F>,
}

impl<P, F> BeerImageDataLoaderWithFallbackComposite<P, F>
where
  P: BeerImageDataLoader,
  F: BeerImageDataLoader + 'static,
{
  pub fn new(primary: P, fallback: F) -> Self {
    Self {
      primary,
      fallback: Arc::new(fallback),
    }
  }
}

#[derive(Default)]
struct WrapperState {
  /// Task of whichever loader is currently in flight
  wrapped: Option<Box<dyn LoaderTask>>,
  handed_off: bool,
  cancelled: bool,
}

/// Shared between the handle given to the caller and the primary's callback.
///
/// Every read and write of the in-flight task happens under `state`, so a
/// cancel racing the primary -> fallback handoff always reaches the task that
/// ends up running.
struct TaskWrapper {
  state: Mutex<WrapperState>,
  slot: Arc<CompletionSlot<ImageDataResult>>,
}

impl TaskWrapper {
  fn new(completion: Completion<ImageDataResult>) -> Self {
    Self {
      state: Mutex::new(WrapperState::default()),
      slot: Arc::new(CompletionSlot::new(completion)),
    }
  }

  /// The primary may finish before its task is even returned; in that case
  /// its task is stale and must not replace the fallback's.
  fn track_primary(&self, task: Box<dyn LoaderTask>) {
    let mut state = self.state.lock();
    if state.cancelled {
      drop(state);
      task.cancel();
    } else if !state.handed_off {
      state.wrapped = Some(task);
    }
  }

  /// Returns false when the caller already cancelled.
  fn begin_fallback(&self) -> bool {
    let mut state = self.state.lock();
    if state.cancelled {
      return false;
    }
    state.handed_off = true;
    state.wrapped = None;
    true
  }

  fn track_fallback(&self, task: Box<dyn LoaderTask>) {
    let mut state = self.state.lock();
    if state.cancelled {
      drop(state);
      task.cancel();
    } else {
      state.wrapped = Some(task);
    }
  }

  fn cancel(&self) {
    if !self.slot.prevent_further_completions() {
      return;
    }
    let current = {
      let mut state = self.state.lock();
      state.cancelled = true;
      state.wrapped.take()
    };
    if let Some(task) = current {
      task.cancel();
    }
  }
}

struct FallbackTask(Arc<TaskWrapper>);

impl LoaderTask for FallbackTask {
  fn cancel(&self) {
    self.0.cancel();
  }
}

impl<P, F> BeerImageDataLoader for BeerImageDataLoaderWithFallbackComposite<P, F>
where
  P: BeerImageDataLoader,
  F: BeerImageDataLoader + 'static,
{
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask> {
    let wrapper = Arc::new(TaskWrapper::new(completion));
    let handoff = wrapper.clone();
    let fallback = Arc::downgrade(&self.fallback);
    let requested = url.clone();

    let primary_task = self.primary.load_image_data(
      url,
      Box::new(move |result| match result {
        Ok(data) => {
          handoff.slot.complete(Ok(data));
        }
        Err(e) => {
          let Some(fallback) = fallback.upgrade() else {
            tracing::debug!(url = %requested, "Loader dropped; skipping fallback");
            return;
          };
          if !handoff.begin_fallback() {
            return;
          }
          tracing::debug!(url = %requested, "Primary image load failed ({}), trying fallback", e);

          let delivery = handoff.slot.clone();
          let task = fallback.load_image_data(
            &requested,
            Box::new(move |result| {
              delivery.complete(result);
            }),
          );
          handoff.track_fallback(task);
        }
      }),
    );
    wrapper.track_primary(primary_task);

    Box::new(FallbackTask(wrapper))
  }
}
