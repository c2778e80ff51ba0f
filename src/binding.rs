//! Disposable handles for Model-to-View bindings.

use core::cell::RefCell;

use crate::observable::Observation;

/// Cancellation handle for a View's Model observations.
///
/// Returned by [`View::bind`](crate::View::bind) and invoked by the event
/// loop on teardown. Disposing is idempotent: the first call runs the
/// teardown closure, later calls do nothing.
///
/// # Example
///
/// ```rust
/// use mvce::{Disposer, Observable};
///
/// let count = Observable::new(0);
/// let title = Observable::new(String::from("Counter"));
///
/// // Combine several observations into a single handle
/// let disposer = Disposer::batch(vec![
///     count.observe(|value| println!("count = {value}")).into(),
///     title.observe(|value| println!("title = {value}")).into(),
/// ]);
///
/// disposer.dispose();
/// disposer.dispose(); // no-op
/// assert!(disposer.is_disposed());
/// assert_eq!(count.observer_count(), 0);
///
/// // Nothing to tear down
/// let disposer = Disposer::none();
/// ```
#[allow(clippy::type_complexity)]
pub struct Disposer(RefCell<Option<Box<dyn FnOnce()>>>);

impl Disposer {
    /// Wrap a teardown closure.
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self(RefCell::new(Some(Box::new(dispose))))
    }

    /// A disposer with nothing to tear down.
    ///
    /// Prefer this when a View renders nothing from the Model.
    pub fn none() -> Self {
        Self::new(|| {})
    }

    /// Combine several disposers; disposing the batch disposes each one in order.
    pub fn batch(disposers: Vec<Disposer>) -> Self {
        Self::new(move || {
            for disposer in &disposers {
                disposer.dispose();
            }
        })
    }

    /// Run the teardown closure if it has not run yet.
    pub fn dispose(&self) {
        // Taken out first so a re-entrant dispose sees an empty slot.
        let dispose = self.0.borrow_mut().take();
        if let Some(dispose) = dispose {
            dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl From<Observation> for Disposer {
    fn from(observation: Observation) -> Self {
        Self::new(move || observation.invalidate())
    }
}

impl core::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
