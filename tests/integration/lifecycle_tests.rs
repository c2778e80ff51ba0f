use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mvce::{
    glue, Controller, Disposer, Emitter, EmitterSlot, LoopSlot, LoopState, Observable,
    TestController, View,
};

use super::{glue_counter, CounterController, CounterEvent, CounterModel, CounterView};

#[test]
fn given_glued_view_should_own_a_wired_loop() {
    let (_model, view, handle) = glue_counter(0);

    assert_eq!(handle.state(), LoopState::Wired);
    assert!(view.loop_slot().is_occupied());
    assert_eq!(view.loop_slot().loop_id(), Some(handle.id()));
}

#[test]
fn given_dropped_view_should_not_invoke_controller_for_later_events() {
    let model = CounterModel::new(0);
    let view = CounterView::new();
    let controller: TestController<CounterModel, CounterEvent> = TestController::new();
    let handle = glue(model.clone(), &view, controller.recording());
    let emitter = handle.emitter();

    emitter.emit(CounterEvent::Increment);
    drop(view);
    emitter.emit(CounterEvent::Increment);
    handle.emitter().emit(CounterEvent::Increment);

    assert_eq!(controller.count(), 1);
    assert_eq!(handle.state(), LoopState::Disposed);
    assert!(!emitter.is_connected());
    assert_eq!(handle.pump(), 0);
}

#[test]
fn given_released_loop_should_dispose_bindings() {
    let (model, view, _handle) = glue_counter(0);
    assert_eq!(model.count.observer_count(), 1);

    assert!(view.loop_slot().release());
    model.count.set(5);

    assert_eq!(model.count.observer_count(), 0);
    assert_eq!(view.label(), Some(0));
}

#[test]
fn given_release_called_twice_should_be_a_no_op_the_second_time() {
    let disposals = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&disposals);
    let view = CounterView::new().with_dispose_hook(move || *counter.borrow_mut() += 1);
    glue(CounterModel::new(0), &view, CounterController);

    assert!(view.loop_slot().release());
    assert!(!view.loop_slot().release());
    drop(view);

    assert_eq!(*disposals.borrow(), 1);
}

#[test]
fn given_released_loop_should_drop_view_events_silently() {
    let (model, view, _handle) = glue_counter(0);
    view.loop_slot().release();

    view.press_increment();

    assert_eq!(model.count.get(), 0);
    assert!(view.events.is_bound());
}

struct DropLogging {
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Drop for DropLogging {
    fn drop(&mut self) {
        self.log.borrow_mut().push("controller dropped");
    }
}

impl Controller for DropLogging {
    type Model = CounterModel;
    type Event = CounterEvent;

    fn update(&mut self, _: &CounterModel, _: CounterEvent, _: &Emitter<CounterEvent>) {}
}

#[test]
fn given_teardown_should_deregister_dispatch_before_disposing_bindings() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let hook_log = Rc::clone(&log);
    let view =
        CounterView::new().with_dispose_hook(move || hook_log.borrow_mut().push("bindings disposed"));
    glue(
        CounterModel::new(0),
        &view,
        DropLogging {
            log: Rc::clone(&log),
        },
    );

    drop(view);

    assert_eq!(*log.borrow(), vec!["controller dropped", "bindings disposed"]);
}

#[test]
fn given_view_glued_twice_should_replace_the_previous_loop() {
    let view = CounterView::new();
    let first: TestController<CounterModel, CounterEvent> = TestController::new();
    let second: TestController<CounterModel, CounterEvent> = TestController::new();
    let first_model = CounterModel::new(0);

    let first_handle = glue(first_model.clone(), &view, first.recording());
    let second_handle = glue(CounterModel::new(50), &view, second.recording());
    view.press_increment();

    assert_eq!(first_handle.state(), LoopState::Disposed);
    assert_eq!(second_handle.state(), LoopState::Wired);
    assert_eq!(first.count(), 0);
    assert_eq!(second.count(), 1);
    assert_eq!(first_model.count.observer_count(), 0);
    assert_eq!(*view.renders.borrow(), vec![0, 50]);
}

/// Emits every value it renders, straight from its binding.
struct EchoView {
    events: Rc<EmitterSlot<i32>>,
    event_loop: LoopSlot,
}

impl View for EchoView {
    type Model = Observable<i32>;
    type Event = i32;

    fn bind(&self, model: &Observable<i32>) -> Disposer {
        let events = Rc::clone(&self.events);
        model.observe(move |value| events.emit(*value)).into()
    }

    fn loop_slot(&self) -> &LoopSlot {
        &self.event_loop
    }

    fn emitter_slot(&self) -> Option<&EmitterSlot<i32>> {
        Some(&self.events)
    }
}

#[test]
fn given_view_glued_again_should_deliver_events_emitted_while_binding_to_the_new_loop() {
    let view = EchoView {
        events: Rc::new(EmitterSlot::new()),
        event_loop: LoopSlot::new(),
    };
    let first: TestController<Observable<i32>, i32> = TestController::new();
    let second: TestController<Observable<i32>, i32> = TestController::new();

    glue(Observable::new(1), &view, first.recording());
    glue(Observable::new(2), &view, second.recording());

    first.with_events(|events| assert_eq!(events, &vec![1]));
    second.with_events(|events| assert_eq!(events, &vec![2]));
    assert!(view.events.is_bound());
}

/// Closes its own view when told to decrement below zero.
struct ClosingController {
    view: Weak<CounterView>,
}

impl Controller for ClosingController {
    type Model = CounterModel;
    type Event = CounterEvent;

    fn update(&mut self, model: &CounterModel, event: CounterEvent, emitter: &Emitter<CounterEvent>) {
        match event {
            CounterEvent::Increment => model.count.update(|count| *count += 1),
            CounterEvent::Decrement if model.count.get() == 0 => {
                // Queued behind this event, must never run.
                emitter.emit(CounterEvent::Increment);
                if let Some(view) = self.view.upgrade() {
                    view.loop_slot().release();
                }
            }
            CounterEvent::Decrement => model.count.update(|count| *count -= 1),
        }
    }
}

#[test]
fn given_controller_releasing_loop_during_update_should_stop_dispatching_queued_events() {
    let model = CounterModel::new(0);
    let view = Rc::new(CounterView::new());
    let handle = glue(
        model.clone(),
        &*view,
        ClosingController {
            view: Rc::downgrade(&view),
        },
    );

    view.press_decrement();

    assert_eq!(model.count.get(), 0);
    assert_eq!(handle.state(), LoopState::Disposed);
    assert!(!view.loop_slot().is_occupied());
}
