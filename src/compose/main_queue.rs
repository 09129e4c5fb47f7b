//! Redirects loader callbacks onto one designated thread.
//!
//! Presentation code usually may only be touched from a single thread. A
//! [`MainQueue`] is a handle to that thread; [`MainQueueDispatchDecorator`]
//! wraps any loader so its callbacks always run there, no matter which worker
//! the transport or the store completed on.

use color_eyre::{eyre::eyre, Result};
use std::marker::PhantomData;
use std::sync::{mpsc, Arc};
use std::thread::{self, ThreadId};
use url::Url;

use crate::beer::{
  BeerImageDataLoader, BeerListLoader, BeerListResult, ImageDataResult,
};
use crate::task::{Completion, CompletionSlot, LoaderTask};

type Job = Box<dyn FnOnce() + Send>;

enum Message {
  Run(Job),
  Quit,
}

/// Handle to the designated thread. Cheap to clone.
#[derive(Clone)]
pub struct MainQueue {
  sender: mpsc::Sender<Message>,
  thread: ThreadId,
}

/// Drains a [`MainQueue`]. Only exists on the designated thread.
pub struct MainLoop {
  receiver: mpsc::Receiver<Message>,
  _not_send: PhantomData<*const ()>,
}

impl MainQueue {
  /// Designate the calling thread. Jobs only run once `MainLoop::run` is
  /// called on it.
  pub fn bind_current() -> (Self, MainLoop) {
    let (sender, receiver) = mpsc::channel();
    let queue = Self {
      sender,
      thread: thread::current().id(),
    };
    let main_loop = MainLoop {
      receiver,
      _not_send: PhantomData,
    };
    (queue, main_loop)
  }

  /// Designate a new thread that runs its loop until `quit` or until every
  /// handle is dropped.
  pub fn spawn(name: &str) -> Result<Self> {
    let (sender, receiver) = mpsc::channel();
    let handle = thread::Builder::new()
      .name(name.to_string())
      .spawn(move || {
        MainLoop {
          receiver,
          _not_send: PhantomData,
        }
        .run()
      })
      .map_err(|e| eyre!("Failed to spawn main queue thread: {}", e))?;

    Ok(Self {
      sender,
      thread: handle.thread().id(),
    })
  }

  pub fn thread_id(&self) -> ThreadId {
    self.thread
  }

  pub fn is_current(&self) -> bool {
    thread::current().id() == self.thread
  }

  /// Run `job` on the designated thread: inline when already there,
  /// otherwise queued behind earlier jobs.
  pub fn dispatch<F>(&self, job: F)
  where
    F: FnOnce() + Send + 'static,
  {
    if self.is_current() {
      return job();
    }

    if self.sender.send(Message::Run(Box::new(job))).is_err() {
      tracing::warn!("Main queue has stopped; dropping dispatched callback");
    }
  }

  /// Ask the loop to stop after the jobs already queued.
  pub fn quit(&self) {
    let _ = self.sender.send(Message::Quit);
  }
}

impl MainLoop {
  /// Run queued jobs until `quit` is called or every `MainQueue` is dropped.
  pub fn run(self) {
    while let Ok(message) = self.receiver.recv() {
      match message {
        Message::Run(job) => job(),
        Message::Quit => break,
      }
    }
  }
}

/// Wraps a loader so all of its completions are delivered on `queue`.
pub struct MainQueueDispatchDecorator<T> {
  decoratee: T,
  queue: MainQueue,
}

impl<T> MainQueueDispatchDecorator<T> {
  pub fn new(decoratee: T, queue: MainQueue) -> Self {
    Self { decoratee, queue }
  }
}

/// Cancels the inner load and, since delivery is checked on the designated
/// thread itself, also stops a callback that was already queued there.
struct DispatchTask {
  slot: Arc<CompletionSlot<ImageDataResult>>,
  inner: Box<dyn LoaderTask>,
}

impl LoaderTask for DispatchTask {
  fn cancel(&self) {
    if self.slot.prevent_further_completions() {
      self.inner.cancel();
    }
  }
}

impl<T: BeerListLoader> BeerListLoader for MainQueueDispatchDecorator<T> {
  fn load(&self, completion: Completion<BeerListResult>) {
    let queue = self.queue.clone();
    self.decoratee.load(Box::new(move |result| {
      queue.dispatch(move || completion(result));
    }));
  }
}

impl<T: BeerImageDataLoader> BeerImageDataLoader for MainQueueDispatchDecorator<T> {
  fn load_image_data(
    &self,
    url: &Url,
    completion: Completion<ImageDataResult>,
  ) -> Box<dyn LoaderTask> {
    let slot = Arc::new(CompletionSlot::new(completion));
    let queue = self.queue.clone();
    let delivery = slot.clone();

    let inner = self.decoratee.load_image_data(
      url,
      Box::new(move |result| {
        queue.dispatch(move || {
          delivery.complete(result);
        });
      }),
    );

    Box::new(DispatchTask { slot, inner })
  }
}
