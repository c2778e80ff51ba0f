//! Test utilities for exercising glued triples.

use core::marker::PhantomData;

use portable_atomic_util::Arc;
use spin::Mutex;

use crate::{Controller, Emitter, EmitterSlot, LoopHandle};

/// Test controller that captures every delivered event for assertions.
///
/// Only available with the `testing` feature.
///
/// `TestController` itself is the inspection handle; [`recording`](Self::recording)
/// and [`with_update`](Self::with_update) produce the [`Controller`] to glue,
/// sharing the same capture storage.
///
/// # Example
///
/// ```rust
/// use mvce::{glue, Disposer, LoopSlot, Observable, TestController, View};
///
/// # struct Model { count: Observable<i32> }
/// # #[derive(Clone, Debug, PartialEq)]
/// # enum Event { Inc }
/// # struct NullView { event_loop: LoopSlot }
/// # impl View for NullView {
/// #     type Model = Model;
/// #     type Event = Event;
/// #     fn bind(&self, _: &Model) -> Disposer { Disposer::none() }
/// #     fn loop_slot(&self) -> &LoopSlot { &self.event_loop }
/// # }
/// let model = Model { count: Observable::new(0) };
/// let view = NullView { event_loop: LoopSlot::new() };
/// let controller: TestController<Model, Event> = TestController::new();
///
/// let handle = glue(
///     Model { count: model.count.clone() },
///     &view,
///     controller.with_update(|model: &Model, _event: &Event, _| {
///         model.count.update(|c| *c += 1)
///     }),
/// );
///
/// handle.emitter().emit(Event::Inc);
///
/// assert_eq!(controller.count(), 1);
/// controller.with_events(|events| assert_eq!(events, &vec![Event::Inc]));
/// assert_eq!(model.count.get(), 1);
/// ```
pub struct TestController<Model, Event> {
    events: Arc<Mutex<Vec<Event>>>,
    _model: PhantomData<fn(&Model)>,
}

impl<Model, Event> Clone for TestController<Model, Event> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            _model: PhantomData,
        }
    }
}

impl<Model, Event> Default for TestController<Model, Event> {
    fn default() -> Self {
        Self::new()
    }
}

type NoopUpdate<Model, Event> = fn(&Model, &Event, &Emitter<Event>);

impl<Model, Event> TestController<Model, Event> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            _model: PhantomData,
        }
    }

    /// A controller that records events and does nothing else.
    pub fn recording(&self) -> RecordingController<Model, Event, NoopUpdate<Model, Event>> {
        self.with_update::<NoopUpdate<Model, Event>>(|_, _, _| {})
    }

    /// A controller that runs `update` for each event, then records it.
    pub fn with_update<F>(&self, update: F) -> RecordingController<Model, Event, F>
    where
        F: FnMut(&Model, &Event, &Emitter<Event>),
    {
        RecordingController {
            events: self.events.clone(),
            update,
            slot: EmitterSlot::new(),
            _model: PhantomData,
        }
    }

    /// Number of events delivered so far.
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    /// Access the captured events with a closure.
    pub fn with_events<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<Event>) -> R,
    {
        let events = self.events.lock();
        f(&events)
    }
}

/// The [`Controller`] half of a [`TestController`].
///
/// Exposes its own [`EmitterSlot`] so tests can emit on the Controller's
/// behalf, before or after glue.
pub struct RecordingController<Model, Event, F> {
    events: Arc<Mutex<Vec<Event>>>,
    update: F,
    slot: EmitterSlot<Event>,
    _model: PhantomData<fn(&Model)>,
}

impl<Model, Event, F> RecordingController<Model, Event, F> {
    /// Emit through the Controller's own slot.
    pub fn emit(&self, event: Event) {
        self.slot.emit(event);
    }
}

impl<Model, Event, F> Controller for RecordingController<Model, Event, F>
where
    F: FnMut(&Model, &Event, &Emitter<Event>),
{
    type Model = Model;
    type Event = Event;

    fn update(&mut self, model: &Model, event: Event, emitter: &Emitter<Event>) {
        (self.update)(model, &event, emitter);
        self.events.lock().push(event);
    }

    fn emitter_slot(&self) -> Option<&EmitterSlot<Event>> {
        Some(&self.slot)
    }
}

/// Block the current thread until the loop dispatches its next event.
///
/// Returns `false` if the loop was torn down.
pub fn dispatch_blocking<Event>(handle: &LoopHandle<Event>) -> bool {
    futures::executor::block_on(handle.dispatch_next())
}
