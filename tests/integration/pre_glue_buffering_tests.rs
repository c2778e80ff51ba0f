use std::cell::RefCell;
use std::rc::Rc;

use mvce::{glue, EmitterSlot, TestController};

use super::{CounterController, CounterEvent, CounterModel, CounterView};

#[test]
fn given_view_emitting_in_constructor_should_deliver_after_glue_with_initial_model() {
    let model = CounterModel::new(7);
    let view = CounterView::emitting_on_construction(&[CounterEvent::Increment]);
    let counts_seen = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&counts_seen);
    let controller: TestController<CounterModel, CounterEvent> = TestController::new();

    assert_eq!(view.events.pending(), 1);

    glue(
        model.clone(),
        &view,
        controller.with_update(move |model: &CounterModel, _event: &CounterEvent, _| {
            seen.borrow_mut().push(model.count.get());
        }),
    );

    assert_eq!(controller.count(), 1);
    controller.with_events(|events| assert_eq!(events, &vec![CounterEvent::Increment]));
    assert_eq!(*counts_seen.borrow(), vec![7]);
    assert_eq!(view.events.pending(), 0);
    assert!(view.events.is_bound());
}

#[test]
fn given_queued_view_events_should_render_initial_state_before_replaying_them() {
    let model = CounterModel::new(0);
    let view = CounterView::emitting_on_construction(&[
        CounterEvent::Increment,
        CounterEvent::Increment,
        CounterEvent::Decrement,
    ]);

    glue(model.clone(), &view, CounterController);

    assert_eq!(*view.renders.borrow(), vec![0, 1, 2, 1]);
    assert_eq!(model.count.get(), 1);
}

#[test]
fn given_queued_events_should_flush_exactly_once() {
    let model = CounterModel::new(0);
    let view = CounterView::emitting_on_construction(&[CounterEvent::Increment]);
    let controller: TestController<CounterModel, CounterEvent> = TestController::new();
    glue(model.clone(), &view, controller.recording());

    view.press_decrement();

    controller.with_events(|events| {
        assert_eq!(events, &vec![CounterEvent::Increment, CounterEvent::Decrement])
    });
}

#[test]
fn given_view_and_controller_both_queued_should_deliver_view_events_first() {
    let model = CounterModel::new(0);
    let view = CounterView::emitting_on_construction(&[CounterEvent::Increment]);
    let controller: TestController<CounterModel, CounterEvent> = TestController::new();
    let recording = controller.recording();
    recording.emit(CounterEvent::Decrement);
    recording.emit(CounterEvent::Decrement);

    glue(model.clone(), &view, recording);

    controller.with_events(|events| {
        assert_eq!(
            events,
            &vec![
                CounterEvent::Increment,
                CounterEvent::Decrement,
                CounterEvent::Decrement
            ]
        )
    });
}

#[test]
fn given_slot_never_bound_should_drop_queued_events_with_it() {
    let payload = Rc::new(CounterEvent::Increment);
    let slot = EmitterSlot::new();
    slot.emit(Rc::clone(&payload));
    slot.emit(Rc::clone(&payload));

    assert!(!slot.is_bound());
    assert_eq!(slot.pending(), 2);
    assert_eq!(Rc::strong_count(&payload), 3);

    drop(slot);

    assert_eq!(Rc::strong_count(&payload), 1);
}
