//! Observable Model properties.
//!
//! [`Observable<T>`] is a shared, single-threaded property cell. Observers
//! registered with [`observe`](Observable::observe) receive the current value
//! immediately and then every change, which is exactly what a View needs to
//! render current state at bind time and stay in sync afterwards.
//!
//! Values compare with `PartialEq`: setting a value equal to the current one
//! is a no-op. Observers are notified in registration order, with no borrow
//! held, so a callback may read or even set the observable again. A nested
//! set delivers the newer value to every observer and ends the outer round.
//!
//! `Observable` is `!Send`. Every notification runs on the thread that owns
//! the Model, which is also the thread the event loop dispatches on, so View
//! code can mutate UI state directly from a callback.

use core::cell::RefCell;
use std::any::Any;
use std::rc::{Rc, Weak};

type ObserverRc<T> = Rc<dyn Fn(&T)>;
type ObserverWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    observers: Vec<ObserverWeak<T>>,
}

/// A shared, version-tracked property with change notification.
///
/// Cloning an `Observable` creates another handle to the same property.
/// Models are usually plain structs of `Observable` fields, cloned into the
/// [`glue`](crate::glue) call while the caller keeps its own handle.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("observer_count", &inner.observers.len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// A clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// # Panics
    ///
    /// Panics if `f` sets or updates this same observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, notifying observers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place, notifying observers if it changed.
    ///
    /// Observers run after `f` returns.
    ///
    /// # Panics
    ///
    /// Panics if `f` reads or writes this same observable (through a clone),
    /// since the value stays mutably borrowed while `f` runs.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            if inner.value != old {
                inner.version += 1;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Number of value-changing mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Live observers. Invalidated ones are pruned eagerly.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.observers.retain(|observer| observer.strong_count() > 0);
        inner.observers.len()
    }

    /// Observe the property: `callback` runs now with the current value,
    /// then after every change until the returned [`Observation`] is
    /// invalidated or dropped.
    pub fn observe(&self, callback: impl Fn(&T) + 'static) -> Observation {
        let strong: ObserverRc<T> = Rc::new(callback);
        let observation = self.register(Rc::clone(&strong));
        strong(&self.get());
        observation
    }

    /// Like [`observe`](Self::observe) but skips the initial delivery.
    pub fn observe_changes(&self, callback: impl Fn(&T) + 'static) -> Observation {
        self.register(Rc::new(callback))
    }

    /// Observe a derived value; `transform` runs before each delivery.
    pub fn observe_map<U>(
        &self,
        transform: impl Fn(&T) -> U + 'static,
        callback: impl Fn(U) + 'static,
    ) -> Observation {
        self.observe(move |value| callback(transform(value)))
    }

    fn register(&self, strong: ObserverRc<T>) -> Observation {
        self.inner
            .borrow_mut()
            .observers
            .push(Rc::downgrade(&strong));
        Observation {
            guard: RefCell::new(Some(Box::new(strong))),
        }
    }

    fn notify(&self) {
        let observers: Vec<ObserverWeak<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.observers.retain(|observer| observer.strong_count() > 0);
            inner.observers.clone()
        };
        let (value, version) = {
            let inner = self.inner.borrow();
            (inner.value.clone(), inner.version)
        };
        // Upgrade lazily so an observer invalidated mid-notify is skipped.
        for observer in &observers {
            // A callback set a newer value; its own notify already reached everyone.
            if self.inner.borrow().version != version {
                break;
            }
            if let Some(callback) = observer.upgrade() {
                callback(&value);
            }
        }
    }
}

/// Token for one live observation.
///
/// Invalidating (or dropping) the token stops delivery. Convert it into a
/// [`Disposer`](crate::Disposer) to return it from
/// [`View::bind`](crate::View::bind).
pub struct Observation {
    guard: RefCell<Option<Box<dyn Any>>>,
}

impl Observation {
    /// Stop delivery. Idempotent.
    pub fn invalidate(&self) {
        let guard = self.guard.borrow_mut().take();
        drop(guard);
    }

    pub fn is_active(&self) -> bool {
        self.guard.borrow().is_some()
    }
}

impl core::fmt::Debug for Observation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observation")
            .field("active", &self.is_active())
            .finish()
    }
}
