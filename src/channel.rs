//! Private, per-loop event queue with a single consumer.

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use flume::{Receiver, Sender};
use tracing::{trace, warn};

use crate::LoopId;

type Handler<Event> = Box<dyn FnMut(Event)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChannelState {
    Open,
    Closed,
}

/// Shared interior of an [`EventChannel`].
///
/// Emitters hold a `Weak` to this, so a torn-down loop never keeps
/// its queue alive through a stray emitter clone.
pub(crate) struct ChannelCore<Event> {
    id: LoopId,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    handler: RefCell<Option<Handler<Event>>>,
    /// Taken off the receiver but not yet delivered; ahead of the queue.
    held: RefCell<VecDeque<Event>>,
    state: Cell<ChannelState>,
    dispatching: Cell<bool>,
}

impl<Event> ChannelCore<Event> {
    pub(crate) fn is_open(&self) -> bool {
        self.state.get() == ChannelState::Open
    }

    pub(crate) fn sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    /// Enqueue an event and drain the queue if nobody else is draining it.
    ///
    /// A post made from inside the handler only enqueues; the drain already
    /// on the stack picks it up after the current event completes.
    pub(crate) fn post(&self, event: Event) {
        if !self.is_open() {
            trace!(loop_id = %self.id, "event posted to closed channel, dropped");
            return;
        }
        // Cannot disconnect: the receiver lives as long as `self`.
        if self.sender.send(event).is_err() {
            return;
        }
        self.drain();
    }

    /// Deliver every queued event to the handler, in queue order.
    ///
    /// Returns the number of events delivered by this call.
    pub(crate) fn drain(&self) -> usize {
        if self.dispatching.get() {
            return 0;
        }
        let Some(mut handler) = self.handler.borrow_mut().take() else {
            return 0;
        };

        self.dispatching.set(true);
        let mut delivered = 0;
        while self.is_open() {
            match self.next_queued() {
                Some(event) => {
                    handler(event);
                    delivered += 1;
                }
                None => break,
            }
        }
        self.dispatching.set(false);

        if self.is_open() {
            *self.handler.borrow_mut() = Some(handler);
        }
        if delivered > 0 {
            trace!(loop_id = %self.id, delivered, "drained event queue");
        }
        delivered
    }

    fn next_queued(&self) -> Option<Event> {
        let held = self.held.borrow_mut().pop_front();
        held.or_else(|| self.receiver.try_recv().ok())
    }

    /// Deliver an event that was already taken off the queue, then drain.
    fn deliver_received(&self, event: Event) -> usize {
        if !self.is_open() {
            return 0;
        }
        if self.dispatching.get() || self.handler.borrow().is_none() {
            // Awaited from inside an update, or before subscribe. The next
            // drain delivers it before anything still on the receiver.
            self.held.borrow_mut().push_back(event);
            return 0;
        }
        let taken = self.handler.borrow_mut().take();
        if let Some(mut handler) = taken {
            self.dispatching.set(true);
            handler(event);
            self.dispatching.set(false);
            if self.is_open() {
                *self.handler.borrow_mut() = Some(handler);
            }
        }
        1 + self.drain()
    }
}

/// A single-consumer, FIFO event queue owned by one event loop.
///
/// Every loop gets its own channel, so independent loops can never
/// cross-deliver. Delivery is synchronous on the thread that posts
/// (or pumps), and at most one handler is registered at a time.
pub(crate) struct EventChannel<Event> {
    core: Rc<ChannelCore<Event>>,
}

impl<Event> EventChannel<Event> {
    pub(crate) fn new(id: LoopId) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            core: Rc::new(ChannelCore {
                id,
                sender,
                receiver,
                handler: RefCell::new(None),
                held: RefCell::new(VecDeque::new()),
                state: Cell::new(ChannelState::Open),
                dispatching: Cell::new(false),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<ChannelCore<Event>> {
        Rc::downgrade(&self.core)
    }

    #[cfg(test)]
    pub(crate) fn post(&self, event: Event) {
        self.core.post(event);
    }

    /// Register the single consumer. Events already queued stay queued
    /// until the next drain.
    pub(crate) fn subscribe(&self, handler: impl FnMut(Event) + 'static) {
        let mut slot = self.core.handler.borrow_mut();
        if slot.is_some() {
            warn!(loop_id = %self.core.id, "channel already has a handler, replacing it");
        }
        *slot = Some(Box::new(handler));
    }

    /// Stop all future delivery and drop the handler.
    ///
    /// Safe to call from inside the handler itself: the drain in progress
    /// stops after the current event and drops the handler on the way out.
    pub(crate) fn unsubscribe(&self) {
        if !self.core.is_open() {
            return;
        }
        self.core.state.set(ChannelState::Closed);
        let handler = self.core.handler.borrow_mut().take();
        drop(handler);
        let held = self.core.held.borrow_mut().drain(..).count();
        let discarded = held + self.core.receiver.drain().count();
        if discarded > 0 {
            warn!(loop_id = %self.core.id, discarded, "channel closed with undelivered events");
        }
    }

    #[cfg(test)]
    pub(crate) fn pump(&self) -> usize {
        self.core.drain()
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        self.core.is_open()
    }
}

/// Wait for the next queued event and dispatch it together with anything
/// queued behind it. Resolves to `false` once the channel is gone or closed.
pub(crate) async fn dispatch_next<Event>(channel: &Weak<ChannelCore<Event>>) -> bool {
    let receiver = match channel.upgrade() {
        Some(core) if core.is_open() => core.receiver.clone(),
        _ => return false,
    };
    let Ok(event) = receiver.recv_async().await else {
        return false;
    };
    match channel.upgrade() {
        Some(core) => {
            core.deliver_received(event);
            core.is_open()
        }
        None => false,
    }
}
