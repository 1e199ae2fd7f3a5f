//! Cells - mutable values with dependency tracking.
//!
//! [`create_cell`] returns a getter/setter pair sharing one value. Reading
//! through the getter subscribes the active context; writing a different
//! value through the setter re-runs every subscriber synchronously.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::context::{current_context, ContextId, WeakContext};

struct CellInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<BTreeMap<ContextId, WeakContext>>,
}

impl<T> CellInner<T> {
    fn track(&self) {
        if let Some(context) = current_context() {
            self.subscribers
                .borrow_mut()
                .entry(context.id())
                .or_insert_with(|| context.downgrade());
        }
    }
}

/// Read half of a cell.
pub struct Getter<T>(Rc<CellInner<T>>);

/// Write half of a cell.
pub struct Setter<T>(Rc<CellInner<T>>);

impl<T> Clone for Getter<T> {
    fn clone(&self) -> Self {
        Getter(self.0.clone())
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Setter(self.0.clone())
    }
}

/// Create a cell holding `initial`.
///
/// ```ignore
/// let (name, set_name) = create_cell(String::from("a"));
/// set_name.set("b".into());
/// set_name.update(|prev| format!("{prev}!"));
/// assert_eq!(name.get(), "b!");
/// ```
pub fn create_cell<T: PartialEq + 'static>(initial: T) -> (Getter<T>, Setter<T>) {
    let inner = Rc::new(CellInner {
        value: RefCell::new(initial),
        subscribers: RefCell::new(BTreeMap::new()),
    });
    (Getter(inner.clone()), Setter(inner))
}

// =============================================================================
// Getter
// =============================================================================

impl<T> Getter<T> {
    /// Current value. Subscribes the active context.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.track();
        self.0.value.borrow().clone()
    }

    /// Borrow the current value. Subscribes the active context.
    ///
    /// Writing to the same cell from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.0.track();
        f(&self.0.value.borrow())
    }

    /// Current value without subscribing anyone.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.0
            .subscribers
            .borrow()
            .values()
            .filter(|weak| weak.upgrade().is_some_and(|c| !c.is_disposed()))
            .count()
    }
}

impl<T: fmt::Debug> fmt::Debug for Getter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Getter").field(&self.0.value.borrow()).finish()
    }
}

// =============================================================================
// Setter
// =============================================================================

impl<T: PartialEq> Setter<T> {
    /// Replace the value. Equal values are ignored.
    pub fn set(&self, value: T) {
        {
            let mut current = self.0.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        self.notify();
    }

    /// Compute the next value from the previous one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.0.value.borrow());
        self.set(next);
    }

    /// Re-run every live subscriber.
    ///
    /// Subscribers are snapshotted first, so contexts that subscribe during
    /// the propagation wait for the next write.
    fn notify(&self) {
        let subscribers: Vec<_> = {
            let mut subscribers = self.0.subscribers.borrow_mut();
            subscribers.retain(|_, weak| weak.upgrade().is_some_and(|c| !c.is_disposed()));
            subscribers.values().filter_map(WeakContext::upgrade).collect()
        };

        tracing::trace!(subscribers = subscribers.len(), "cell changed");
        for context in subscribers {
            context.execute();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Setter").field(&self.0.value.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{reset_runtime, run_reactive, untracked};
    use std::cell::Cell;

    #[test]
    fn test_set_and_get() {
        reset_runtime();

        let (value, set_value) = create_cell(1);
        assert_eq!(value.get(), 1);

        set_value.set(5);
        assert_eq!(value.get(), 5);

        set_value.update(|prev| prev * 2);
        assert_eq!(value.get(), 10);
    }

    #[test]
    fn test_effect_reruns_on_change() {
        reset_runtime();

        let (count, set_count) = create_cell(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        run_reactive(move || seen_clone.borrow_mut().push(count.get()));
        set_count.set(1);
        set_count.set(2);

        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_equal_write_is_suppressed() {
        reset_runtime();

        let (name, set_name) = create_cell("a".to_string());
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        run_reactive(move || {
            name.with(|_| ());
            runs_clone.set(runs_clone.get() + 1);
        });

        set_name.set("a".to_string());
        set_name.update(|prev| prev.clone());
        assert_eq!(runs.get(), 1, "equal writes must not notify");

        set_name.set("b".to_string());
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_registration_is_idempotent() {
        reset_runtime();

        let (value, set_value) = create_cell(0);
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let value_clone = value.clone();

        run_reactive(move || {
            value_clone.get();
            value_clone.get();
            value_clone.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        assert_eq!(value.subscriber_count(), 1);
        set_value.set(1);
        assert_eq!(runs.get(), 2, "one run per notification");
    }

    #[test]
    fn test_read_outside_context_does_not_subscribe() {
        reset_runtime();

        let (value, _set_value) = create_cell(0);
        value.get();
        run_reactive({
            let value = value.clone();
            move || {
                untracked(|| value.get());
            }
        });

        assert_eq!(value.subscriber_count(), 0);
    }

    #[test]
    fn test_disposed_context_is_not_notified() {
        reset_runtime();

        let (value, set_value) = create_cell(0);
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let ctx = run_reactive(move || {
            value.get();
            runs_clone.set(runs_clone.get() + 1);
        });
        ctx.dispose();

        set_value.set(1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_nested_write_propagates_depth_first() {
        reset_runtime();

        let (a, set_a) = create_cell(0);
        let (b, set_b) = create_cell(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_b = log.clone();
        run_reactive(move || log_b.borrow_mut().push(format!("b={}", b.get())));

        let log_a = log.clone();
        run_reactive(move || {
            let v = a.get();
            log_a.borrow_mut().push(format!("a={v}"));
            set_b.set(v * 10);
            log_a.borrow_mut().push(format!("after b={}", v * 10));
        });

        log.borrow_mut().clear();
        set_a.set(1);

        assert_eq!(*log.borrow(), vec!["a=1", "b=10", "after b=10"]);
    }

    #[test]
    fn test_self_write_converges() {
        reset_runtime();

        let (count, set_count) = create_cell(0);
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let reader = count.clone();

        run_reactive(move || {
            runs_clone.set(runs_clone.get() + 1);
            let current = reader.get();
            if current < 3 {
                set_count.set(current + 1);
            }
        });

        assert_eq!(count.get_untracked(), 3);
        assert_eq!(runs.get(), 4, "one run per value, never nested");
    }
}
