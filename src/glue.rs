//! Composition entry point.

use crate::event_loop::{EventLoop, LoopState};
use crate::{Controller, LoopHandle, View};

/// Glue a Model, a View and a Controller into a running event loop.
///
/// The loop is stored in the View's [`LoopSlot`](crate::LoopSlot) and lives
/// exactly as long as the View does (or until the slot is released). A loop
/// previously glued onto the same View is torn down first, so a View is
/// never driven by two loops at once.
///
/// Wiring order:
/// - the View binds to the Model and renders its current state;
/// - the View's and then the Controller's [`EmitterSlot`](crate::EmitterSlot)s,
///   if they expose one, are bound to the loop;
/// - events those slots queued before this call are dispatched, in the
///   order they were emitted, before `glue` returns.
///
/// The View and Controller must agree on the Model and Event types; that is
/// enforced by the signature.
///
/// Returns a [`LoopHandle`] for pumping remote events or emitting from
/// outside the View. Dropping it has no effect on the loop.
pub fn glue<Model, Event, V, C>(model: Model, view: &V, controller: C) -> LoopHandle<Event>
where
    Model: 'static,
    Event: 'static,
    V: View<Model = Model, Event = Event>,
    C: Controller<Model = Model, Event = Event> + 'static,
{
    let slot = view.loop_slot();
    slot.release();
    // Anything emitted while the new loop is wired queues for it instead of
    // reaching the loop just released.
    if let Some(events) = view.emitter_slot() {
        events.unbind();
    }
    if let Some(events) = controller.emitter_slot() {
        events.unbind();
    }

    let event_loop = EventLoop::wire(model, view, controller);
    debug_assert_eq!(event_loop.state(), LoopState::Wired);
    let handle = event_loop.handle();
    slot.retain(Box::new(event_loop));

    // Owned by the View from here on; flush what was emitted before glue.
    handle.pump();
    handle
}
