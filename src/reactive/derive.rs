//! Derived values.

use std::rc::Rc;

use super::cell::{create_cell, Getter};
use super::context::Context;

/// Create a getter whose value is recomputed from `f` whenever a cell `f`
/// reads changes.
///
/// The derived value lives in an ordinary cell, so readers of the returned
/// getter are notified like readers of any other cell, and equal results do
/// not propagate.
///
/// ```ignore
/// let (count, set_count) = create_cell(2);
/// let doubled = derive(move || count.get() * 2);
/// set_count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub fn derive<T, F>(f: F) -> Getter<T>
where
    T: PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    let f = Rc::new(f);
    let context = Context::detached(Some("derive".to_string()));

    // First evaluation happens inside the context so its reads are tracked.
    let initial = context.enter(|| f());
    let (getter, setter) = create_cell(initial);

    context.set_closure(move || setter.set(f()));
    getter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{create_cell, reset_runtime, run_reactive};
    use std::cell::Cell;

    #[test]
    fn test_derive_tracks_dependencies() {
        reset_runtime();

        let (count, set_count) = create_cell(2);
        let doubled = derive(move || count.get() * 2);
        assert_eq!(doubled.get(), 4);

        set_count.set(5);
        assert_eq!(doubled.get(), 10);
    }

    #[test]
    fn test_derive_notifies_readers() {
        reset_runtime();

        let (first, set_first) = create_cell("Ada".to_string());
        let (last, set_last) = create_cell("Lovelace".to_string());
        let full = derive(move || format!("{} {}", first.get(), last.get()));

        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let full_clone = full.clone();
        run_reactive(move || seen_clone.borrow_mut().push(full_clone.get()));

        set_first.set("Grace".to_string());
        set_last.set("Hopper".to_string());

        assert_eq!(*seen.borrow(), vec!["Ada Lovelace", "Grace Lovelace", "Grace Hopper"]);
    }

    #[test]
    fn test_derive_suppresses_equal_results() {
        reset_runtime();

        let (n, set_n) = create_cell(1);
        let is_even = derive(move || n.get() % 2 == 0);

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        run_reactive(move || {
            is_even.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        set_n.set(3);
        set_n.set(5);
        assert_eq!(runs.get(), 1, "parity never changed");

        set_n.set(6);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_diamond_may_run_downstream_twice() {
        reset_runtime();

        let (source, set_source) = create_cell(1);
        let left = {
            let source = source.clone();
            derive(move || source.get() + 1)
        };
        let right = derive(move || source.get() * 10);

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        run_reactive(move || {
            left.get();
            right.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        set_source.set(2);
        assert!(runs.get() >= 2, "downstream ran at least once more");
        assert!(runs.get() <= 3, "no more than once per upstream branch");
    }
}
