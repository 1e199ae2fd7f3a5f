//! Property-based tests for cells and reconciliation.
//!
//! 1. `set` then `get` returns the written value
//! 2. Equal writes never re-run subscribers
//! 3. Empty-equivalent children replace each other without host mutations
//! 4. A list producer patched to a prefix keeps the surviving host nodes
//! 5. Any producer list update leaves the host tree matching the output

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use spark_dom::{
    create_cell, render, replace_node, reset_runtime, run_reactive, to_node, Child, DomNode, MutationKind,
    MutationObserver,
};

// ── Helpers ──────────────────────────────────────────────────────────

/// Children that convert to empty-equivalent nodes.
fn arb_empty_child() -> impl Strategy<Value = Child> {
    let leaf = Just(Child::Null);
    leaf.prop_recursive(3, 12, 4, |inner| proptest::collection::vec(inner, 0..4).prop_map(Child::List))
}

fn words() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{1,4}", 0..8)
}

fn texts(root: &DomNode) -> Vec<String> {
    root.children().iter().map(DomNode::text_content).filter(|t| !t.is_empty()).collect()
}

// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn set_then_get(initial in any::<i64>(), writes in proptest::collection::vec(any::<i64>(), 1..16)) {
        reset_runtime();
        let (value, set_value) = create_cell(initial);
        for write in &writes {
            set_value.set(*write);
            prop_assert_eq!(value.get(), *write);
        }
    }

    #[test]
    fn update_applies_to_previous(initial in -1000i64..1000, delta in -1000i64..1000) {
        reset_runtime();
        let (value, set_value) = create_cell(initial);
        set_value.update(|prev| prev + delta);
        prop_assert_eq!(value.get(), initial + delta);
    }

    #[test]
    fn equal_writes_are_suppressed(values in proptest::collection::vec(0u8..4, 1..32)) {
        reset_runtime();
        let (value, set_value) = create_cell(values[0]);
        let runs = Rc::new(Cell::new(0usize));
        let runs_clone = runs.clone();
        run_reactive(move || {
            value.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        let mut expected = 1;
        let mut current = values[0];
        for next in &values[1..] {
            if *next != current {
                expected += 1;
                current = *next;
            }
            set_value.set(*next);
        }
        prop_assert_eq!(runs.get(), expected);
    }

    #[test]
    fn empty_equivalents_are_interchangeable(a in arb_empty_child(), b in arb_empty_child()) {
        reset_runtime();
        let root = DomNode::element("div");
        let prev = render(&root, a).unwrap();
        let next = to_node(b).unwrap();
        prop_assert!(prev.is_empty_equivalent());
        prop_assert!(next.is_empty_equivalent());

        let observer = MutationObserver::new(MutationKind::all());
        observer.observe(&root);
        let result = replace_node(&prev, &next, None).unwrap();

        prop_assert!(result.ptr_eq(&prev));
        prop_assert_eq!(observer.record_count(), 0);
    }

    #[test]
    fn prefix_shrink_keeps_host_nodes(items in words(), keep in 0usize..8) {
        reset_runtime();
        let keep = keep.min(items.len());
        let (list, set_list) = create_cell(items.clone());
        let root = DomNode::element("ul");
        render(&root, Child::producer(move || list.get())).unwrap();
        let before = root.children();

        set_list.set(items[..keep].to_vec());

        prop_assert_eq!(texts(&root), items[..keep].to_vec());
        if keep > 0 {
            prop_assert_eq!(root.children(), before[..keep].to_vec());
        }
    }

    #[test]
    fn host_tree_follows_producer(steps in proptest::collection::vec(words(), 1..6)) {
        reset_runtime();
        let (list, set_list) = create_cell(Vec::<String>::new());
        let root = DomNode::element("ul");
        render(&root, Child::producer(move || list.get())).unwrap();

        for step in steps {
            set_list.set(step.clone());
            prop_assert_eq!(texts(&root), step);
        }
    }
}
