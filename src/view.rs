//! View abstraction and the slot that keeps a View's event loop alive.

use core::cell::RefCell;

use tracing::debug;

use crate::{Disposer, EmitterSlot, LoopId};

/// The rendering half of an MVCE triple.
///
/// A View renders a Model through bindings and turns user interaction into
/// Events. It never mutates the Model itself.
///
/// Implement this trait to integrate mvce with your rendering system (GUI
/// toolkit, terminal, embedded display, etc.).
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use mvce::{Disposer, EmitterSlot, LoopSlot, Observable, View};
///
/// struct CounterModel { count: Observable<i32> }
///
/// enum CounterEvent { Increment, Decrement }
///
/// struct CounterView {
///     label: Rc<RefCell<String>>,
///     events: EmitterSlot<CounterEvent>,
///     event_loop: LoopSlot,
/// }
///
/// impl CounterView {
///     // Wired to the "+" button by the toolkit.
///     fn on_increment_pressed(&self) {
///         self.events.emit(CounterEvent::Increment);
///     }
/// }
///
/// impl View for CounterView {
///     type Model = CounterModel;
///     type Event = CounterEvent;
///
///     fn bind(&self, model: &CounterModel) -> Disposer {
///         let label = Rc::clone(&self.label);
///         model
///             .count
///             .observe(move |count| *label.borrow_mut() = count.to_string())
///             .into()
///     }
///
///     fn loop_slot(&self) -> &LoopSlot {
///         &self.event_loop
///     }
///
///     fn emitter_slot(&self) -> Option<&EmitterSlot<CounterEvent>> {
///         Some(&self.events)
///     }
/// }
/// ```
pub trait View {
    type Model;
    type Event;

    /// Subscribe to the Model and render its current state.
    ///
    /// Called once when the View is glued. The binding must deliver the
    /// current value immediately and every change afterwards (see
    /// [`Observable::observe`](crate::Observable::observe)). The returned
    /// [`Disposer`] stops all of it and runs when the loop is torn down.
    fn bind(&self, model: &Self::Model) -> Disposer;

    /// Storage for the event loop driving this View.
    ///
    /// The View owns its loop: when the View (and with it the slot) is
    /// dropped, the loop is torn down.
    fn loop_slot(&self) -> &LoopSlot;

    /// The View's own emission capability, if it emits events.
    ///
    /// Views returning `Some` get their slot bound by [`glue`](crate::glue);
    /// anything emitted before that is delivered once the loop is wired.
    fn emitter_slot(&self) -> Option<&EmitterSlot<Self::Event>> {
        None
    }
}

/// A type-erased event loop retained by a View.
pub(crate) trait RetainedLoop {
    fn id(&self) -> LoopId;
    fn dispose(&self);
}

/// Back-reference from a View to the event loop glued onto it.
///
/// Nothing else owns the loop, so its lifetime is exactly the lifetime of
/// the slot. Gluing the same View again replaces (and tears down) the loop
/// it held before.
#[derive(Default)]
pub struct LoopSlot {
    retained: RefCell<Option<Box<dyn RetainedLoop>>>,
}

impl LoopSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self) -> bool {
        self.retained.borrow().is_some()
    }

    /// Identifier of the retained loop, if any.
    pub fn loop_id(&self) -> Option<LoopId> {
        self.retained.borrow().as_ref().map(|retained| retained.id())
    }

    /// Tear down and drop the retained loop ahead of the View.
    ///
    /// Returns `false` if there was nothing to release.
    pub fn release(&self) -> bool {
        // Moved out before teardown runs, which may re-enter the View.
        let retained = self.retained.borrow_mut().take();
        match retained {
            Some(retained) => {
                debug!(loop_id = %retained.id(), "releasing event loop");
                retained.dispose();
                true
            }
            None => false,
        }
    }

    pub(crate) fn retain(&self, event_loop: Box<dyn RetainedLoop>) {
        let previous = self.retained.borrow_mut().replace(event_loop);
        if let Some(previous) = previous {
            debug!(loop_id = %previous.id(), "replacing event loop held by view");
            previous.dispose();
        }
    }
}

impl core::fmt::Debug for LoopSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoopSlot")
            .field("loop_id", &self.loop_id())
            .finish()
    }
}
