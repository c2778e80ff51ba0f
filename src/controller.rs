//! Controller trait defining how Events mutate the Model.

use crate::{Emitter, EmitterSlot};

/// The decision half of an MVCE triple.
///
/// The Controller is the only writer of the Model. For every Event the
/// event loop calls [`update`](Self::update) on the loop's owning thread,
/// one Event at a time, in emission order.
///
/// See the [crate-level documentation](crate) for a complete example.
pub trait Controller {
    type Model;
    type Event;

    /// Apply an event to the Model.
    ///
    /// # Arguments
    ///
    /// * `model` - The Model glued to this Controller; mutate it directly
    /// * `event` - The event to process
    /// * `emitter` - Emitter for follow-up events. Emitted events are queued
    ///   and processed after this call returns, never recursively. Use
    ///   [`Emitter::remote`] to hand a thread-safe copy to background work.
    fn update(&mut self, model: &Self::Model, event: Self::Event, emitter: &Emitter<Self::Event>);

    /// The Controller's own emission capability, if it emits events outside
    /// of [`update`](Self::update).
    ///
    /// Controllers returning `Some` get their slot bound by
    /// [`glue`](crate::glue), after the View's.
    fn emitter_slot(&self) -> Option<&EmitterSlot<Self::Event>> {
        None
    }
}
