//! Event emission capabilities handed to Views and Controllers.

use core::cell::RefCell;
use core::mem;
use std::rc::Weak;

use flume::Sender;
use tracing::trace;

use crate::channel::{ChannelCore, EventChannel};
use crate::LoopId;

/// Emission capability bound to one event loop.
///
/// Cloning is cheap: an `Emitter` only holds a weak reference to the loop's
/// private queue. Emitting after the loop has been torn down drops the event.
///
/// `Emitter` is deliberately `!Send`; events must be emitted from the thread
/// that owns the loop. Use [`Emitter::remote`] to get a handle that can be
/// moved to worker threads.
///
/// # Example
///
/// ```rust
/// use mvce::{glue, Controller, Disposer, Emitter, EmitterSlot, LoopSlot, Observable, View};
///
/// #[derive(Clone, Copy)]
/// enum Event { Reset, Cleared }
///
/// struct ResetController;
///
/// impl Controller for ResetController {
///     type Model = Observable<i32>;
///     type Event = Event;
///
///     fn update(&mut self, model: &Observable<i32>, event: Event, emitter: &Emitter<Event>) {
///         match event {
///             Event::Reset => {
///                 model.set(0);
///                 // Queued behind the current event, never delivered recursively.
///                 emitter.emit(Event::Cleared);
///             }
///             Event::Cleared => {}
///         }
///     }
/// }
///
/// struct NullView { events: EmitterSlot<Event>, event_loop: LoopSlot }
///
/// impl View for NullView {
///     type Model = Observable<i32>;
///     type Event = Event;
///
///     fn bind(&self, _model: &Observable<i32>) -> Disposer { Disposer::none() }
///     fn loop_slot(&self) -> &LoopSlot { &self.event_loop }
///     fn emitter_slot(&self) -> Option<&EmitterSlot<Event>> { Some(&self.events) }
/// }
///
/// let model = Observable::new(5);
/// let view = NullView { events: EmitterSlot::new(), event_loop: LoopSlot::new() };
/// glue(model.clone(), &view, ResetController);
///
/// view.events.emit(Event::Reset);
/// assert_eq!(model.get(), 0);
/// ```
pub struct Emitter<Event> {
    id: LoopId,
    channel: Weak<ChannelCore<Event>>,
}

impl<Event> Clone for Emitter<Event> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            channel: self.channel.clone(),
        }
    }
}

impl<Event> Emitter<Event> {
    pub(crate) fn new(id: LoopId, channel: &EventChannel<Event>) -> Self {
        Self {
            id,
            channel: channel.downgrade(),
        }
    }

    pub(crate) fn from_weak(id: LoopId, channel: Weak<ChannelCore<Event>>) -> Self {
        Self { id, channel }
    }

    /// Emit an event.
    ///
    /// If the loop is idle the event is dispatched to the Controller before
    /// this call returns. If the loop is already dispatching (the call comes
    /// from inside an update), the event is queued and runs after the
    /// current one completes.
    pub fn emit(&self, event: Event) {
        match self.channel.upgrade() {
            Some(channel) => channel.post(event),
            None => trace!(loop_id = %self.id, "emitter outlived its loop, event dropped"),
        }
    }

    /// Identifier of the loop this emitter feeds.
    pub fn loop_id(&self) -> LoopId {
        self.id
    }

    /// Whether the loop is still wired and accepting events.
    pub fn is_connected(&self) -> bool {
        self.channel
            .upgrade()
            .is_some_and(|channel| channel.is_open())
    }

    /// A thread-safe handle into the same queue.
    ///
    /// Returns `None` when the loop is already gone.
    pub fn remote(&self) -> Option<RemoteEmitter<Event>>
    where
        Event: Send,
    {
        self.channel.upgrade().map(|channel| RemoteEmitter {
            id: self.id,
            sender: channel.sender(),
        })
    }
}

/// Thread-safe emission handle for asynchronous work.
///
/// Events sent through a `RemoteEmitter` are only enqueued. They reach the
/// Controller on the loop's owning thread, the next time the loop drains:
/// on the next local [`Emitter::emit`], on [`LoopHandle::pump`](crate::LoopHandle::pump),
/// or when [`LoopHandle::dispatch_next`](crate::LoopHandle::dispatch_next) resolves.
pub struct RemoteEmitter<Event: Send> {
    id: LoopId,
    sender: Sender<Event>,
}

impl<Event: Send> Clone for RemoteEmitter<Event> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
        }
    }
}

impl<Event: Send> RemoteEmitter<Event> {
    /// Enqueue an event for the owning thread.
    ///
    /// Multiple threads can safely call this concurrently. Events sent after
    /// the loop is dropped are discarded.
    pub fn emit(&self, event: Event) {
        if self.sender.send(event).is_err() {
            trace!(loop_id = %self.id, "remote event sent to dropped loop");
        }
    }

    pub fn loop_id(&self) -> LoopId {
        self.id
    }
}

enum SlotState<Event> {
    Unbound(Vec<Event>),
    Bound(Emitter<Event>),
}

/// Emission capability owned by a View or Controller.
///
/// Embed one in any View or Controller that produces events on its own
/// (button handlers, timers, self-triggered transitions). Until
/// [`glue`](crate::glue) binds it, emitted events are queued in order. Binding
/// flushes the queue exactly once, then every later `emit` forwards straight
/// to the loop.
///
/// If the slot is never bound, queued events are dropped with it.
pub struct EmitterSlot<Event> {
    state: RefCell<SlotState<Event>>,
}

impl<Event> Default for EmitterSlot<Event> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Event> EmitterSlot<Event> {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SlotState::Unbound(Vec::new())),
        }
    }

    /// Emit an event, or queue it if the slot is not yet bound to a loop.
    pub fn emit(&self, event: Event) {
        let emitter = match &mut *self.state.borrow_mut() {
            SlotState::Unbound(queue) => {
                queue.push(event);
                trace!(queued = queue.len(), "emitter slot unbound, event queued");
                return;
            }
            SlotState::Bound(emitter) => emitter.clone(),
        };
        // The borrow is released before dispatch so updates can re-enter.
        emitter.emit(event);
    }

    /// Whether a loop has been attached.
    pub fn is_bound(&self) -> bool {
        matches!(*self.state.borrow(), SlotState::Bound(_))
    }

    /// Number of events waiting for the slot to be bound.
    pub fn pending(&self) -> usize {
        match &*self.state.borrow() {
            SlotState::Unbound(queue) => queue.len(),
            SlotState::Bound(_) => 0,
        }
    }

    /// Attach the slot to a loop and flush anything queued, in emission order.
    ///
    /// Rebinding an already bound slot only swaps the target.
    pub(crate) fn bind(&self, emitter: Emitter<Event>) {
        let previous = mem::replace(
            &mut *self.state.borrow_mut(),
            SlotState::Bound(emitter.clone()),
        );
        if let SlotState::Unbound(queue) = previous {
            if !queue.is_empty() {
                trace!(loop_id = %emitter.loop_id(), flushed = queue.len(), "flushing events queued before glue");
            }
            for event in queue {
                emitter.emit(event);
            }
        }
    }

    /// Detach from a torn-down loop so emissions queue again until the next
    /// [`bind`](Self::bind). An unbound slot keeps its queue.
    pub(crate) fn unbind(&self) {
        let mut state = self.state.borrow_mut();
        if let SlotState::Bound(emitter) = &*state {
            trace!(loop_id = %emitter.loop_id(), "emitter slot detached");
            *state = SlotState::Unbound(Vec::new());
        }
    }
}
