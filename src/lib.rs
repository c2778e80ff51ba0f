//! A small Model-View-Controller-Event (MVCE) glue runtime.
//!
//! Three roles, none holding a reference to another:
//! - the **Model** is observable, mutable state;
//! - the **View** renders the Model through bindings and emits Events;
//! - the **Controller** consumes Events and mutates the Model.
//!
//! [`glue`] wires a triple into an event loop owned by the View. Events are
//! dispatched one at a time, in emission order, on the thread that owns the
//! loop. Events emitted before the wiring exists are queued by the emitter's
//! [`EmitterSlot`] and delivered once it does.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use mvce::{glue, Controller, Disposer, Emitter, EmitterSlot, LoopSlot, Observable, View};
//!
//! #[derive(Clone)]
//! struct CounterModel { count: Observable<i32> }
//!
//! enum CounterEvent { Increment, Decrement }
//!
//! struct CounterController;
//!
//! impl Controller for CounterController {
//!     type Model = CounterModel;
//!     type Event = CounterEvent;
//!
//!     fn update(&mut self, model: &CounterModel, event: CounterEvent, _: &Emitter<CounterEvent>) {
//!         match event {
//!             CounterEvent::Increment => model.count.update(|c| *c += 1),
//!             CounterEvent::Decrement => model.count.update(|c| *c -= 1),
//!         }
//!     }
//! }
//!
//! struct CounterView {
//!     label: Rc<RefCell<String>>,
//!     events: EmitterSlot<CounterEvent>,
//!     event_loop: LoopSlot,
//! }
//!
//! impl View for CounterView {
//!     type Model = CounterModel;
//!     type Event = CounterEvent;
//!
//!     fn bind(&self, model: &CounterModel) -> Disposer {
//!         let label = Rc::clone(&self.label);
//!         model.count.observe(move |c| *label.borrow_mut() = c.to_string()).into()
//!     }
//!
//!     fn loop_slot(&self) -> &LoopSlot { &self.event_loop }
//!
//!     fn emitter_slot(&self) -> Option<&EmitterSlot<CounterEvent>> { Some(&self.events) }
//! }
//!
//! let model = CounterModel { count: Observable::new(0) };
//! let view = CounterView {
//!     label: Rc::new(RefCell::new(String::new())),
//!     events: EmitterSlot::new(),
//!     event_loop: LoopSlot::new(),
//! };
//!
//! glue(model.clone(), &view, CounterController);
//! assert_eq!(*view.label.borrow(), "0");
//!
//! // Button presses end up here
//! view.events.emit(CounterEvent::Increment);
//! view.events.emit(CounterEvent::Increment);
//! view.events.emit(CounterEvent::Decrement);
//!
//! assert_eq!(model.count.get(), 1);
//! assert_eq!(*view.label.borrow(), "1");
//! ```
//!
//! ## Threading
//!
//! Everything above is single-threaded: [`Emitter`], [`EmitterSlot`] and
//! [`Observable`] are `!Send`, and `emit` must be called on the thread that
//! owns the loop. Background work reports back through a [`RemoteEmitter`],
//! whose events are dispatched on the owning thread by
//! [`LoopHandle::pump`] or [`LoopHandle::dispatch_next`].

// Module declarations
mod binding;
mod channel;
mod controller;
mod emitter;
mod event_loop;
mod glue;
mod observable;
mod view;

#[cfg(any(test, feature = "testing"))]
mod testing;

// Public re-exports
pub use binding::Disposer;
pub use controller::Controller;
pub use emitter::{Emitter, EmitterSlot, RemoteEmitter};
pub use event_loop::{LoopHandle, LoopId, LoopState};
pub use glue::glue;
pub use observable::{Observable, Observation};
pub use view::{LoopSlot, View};

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub use testing::{dispatch_blocking, RecordingController, TestController};
