//! The dispatch loop wiring a View, a Controller and their Model together.

use core::cell::Cell;
use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Weak;

use tracing::debug;

use crate::channel::{self, ChannelCore, EventChannel};
use crate::view::RetainedLoop;
use crate::{Controller, Disposer, Emitter, RemoteEmitter, View};

static NEXT_LOOP_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one event loop.
///
/// Only used for diagnostics; loops never share a queue, whatever their id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopId(u64);

impl LoopId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for LoopId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "loop#{}", self.0)
    }
}

/// Lifecycle of an event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Allocated, wiring in progress.
    Constructing,
    /// Bound to the View and subscribed; events are being dispatched.
    Wired,
    /// Torn down: no further Controller updates, bindings disposed.
    Disposed,
}

/// The dispatch loop for one (Model, View, Controller) triple.
///
/// Owns the Model and the Controller (through the channel handler), the
/// private event channel and the View's binding disposer. It is retained by
/// the View's [`LoopSlot`](crate::LoopSlot) and torn down when that slot is
/// released or dropped.
pub(crate) struct EventLoop<Event> {
    id: LoopId,
    channel: EventChannel<Event>,
    disposer: Disposer,
    state: Cell<LoopState>,
}

impl<Event: 'static> EventLoop<Event> {
    /// Wire the triple together.
    ///
    /// 1. Bind the View to the Model and keep the disposer
    /// 2. Create the loop's emitter
    /// 3. Bind the View's and then the Controller's emitter slots, moving
    ///    anything they queued into the channel
    /// 4. Subscribe the channel handler that drives [`Controller::update`]
    ///
    /// Events queued in step 3 stay in the channel until the first drain.
    pub(crate) fn wire<Model, V, C>(model: Model, view: &V, mut controller: C) -> Self
    where
        Model: 'static,
        V: View<Model = Model, Event = Event>,
        C: Controller<Model = Model, Event = Event> + 'static,
    {
        let id = LoopId::next();
        let channel = EventChannel::new(id);
        let state = Cell::new(LoopState::Constructing);

        let disposer = view.bind(&model);

        let emitter = Emitter::new(id, &channel);
        if let Some(slot) = view.emitter_slot() {
            slot.bind(emitter.clone());
        }
        if let Some(slot) = controller.emitter_slot() {
            slot.bind(emitter.clone());
        }

        channel.subscribe(move |event| {
            controller.update(&model, event, &emitter);
        });
        state.set(LoopState::Wired);
        debug!(loop_id = %id, "event loop wired");

        Self {
            id,
            channel,
            disposer,
            state,
        }
    }
}

impl<Event> EventLoop<Event> {
    pub(crate) fn handle(&self) -> LoopHandle<Event> {
        LoopHandle {
            id: self.id,
            channel: self.channel.downgrade(),
        }
    }

    pub(crate) fn state(&self) -> LoopState {
        self.state.get()
    }

    /// Tear the loop down. Idempotent.
    ///
    /// The channel handler is deregistered before the bindings are disposed,
    /// so no Controller update can run against a View that stopped
    /// observing.
    pub(crate) fn dispose(&self) {
        if self.state.get() == LoopState::Disposed {
            return;
        }
        self.state.set(LoopState::Disposed);
        self.channel.unsubscribe();
        self.disposer.dispose();
        debug!(loop_id = %self.id, "event loop disposed");
    }
}

impl<Event: 'static> RetainedLoop for EventLoop<Event> {
    fn id(&self) -> LoopId {
        self.id
    }

    fn dispose(&self) {
        EventLoop::dispose(self);
    }
}

impl<Event> Drop for EventLoop<Event> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Non-owning handle to a glued event loop.
///
/// Returned by [`glue`](crate::glue). The loop itself belongs to the View;
/// this handle never keeps it alive, and every operation degrades to a no-op
/// once the View is gone.
pub struct LoopHandle<Event> {
    id: LoopId,
    channel: Weak<ChannelCore<Event>>,
}

impl<Event> Clone for LoopHandle<Event> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            channel: self.channel.clone(),
        }
    }
}

impl<Event> LoopHandle<Event> {
    pub fn id(&self) -> LoopId {
        self.id
    }

    /// [`LoopState::Wired`] while the loop dispatches, [`LoopState::Disposed`] after.
    pub fn state(&self) -> LoopState {
        if self.is_wired() {
            LoopState::Wired
        } else {
            LoopState::Disposed
        }
    }

    pub fn is_wired(&self) -> bool {
        self.channel
            .upgrade()
            .is_some_and(|channel| channel.is_open())
    }

    /// An emitter feeding this loop.
    pub fn emitter(&self) -> Emitter<Event> {
        Emitter::from_weak(self.id, self.channel.clone())
    }

    /// A thread-safe emitter feeding this loop, if it is still alive.
    pub fn remote_emitter(&self) -> Option<RemoteEmitter<Event>>
    where
        Event: Send,
    {
        self.emitter().remote()
    }

    /// Dispatch everything queued right now, typically events sent through
    /// a [`RemoteEmitter`]. Call it from the loop's owning thread, e.g. once
    /// per host run-loop iteration.
    ///
    /// Returns the number of events dispatched.
    pub fn pump(&self) -> usize {
        self.channel
            .upgrade()
            .map_or(0, |channel| channel.drain())
    }

    /// Wait for the next event and dispatch it, along with anything queued
    /// behind it.
    ///
    /// Resolves to `false` if the loop is (or becomes) torn down. A pending
    /// wait is not woken by teardown; drop the future instead.
    pub async fn dispatch_next(&self) -> bool {
        channel::dispatch_next(&self.channel).await
    }
}

impl<Event> core::fmt::Debug for LoopHandle<Event> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoopHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
