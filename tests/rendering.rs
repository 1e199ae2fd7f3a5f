//! End-to-end rendering scenarios against the in-memory host tree.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_dom::{
    create_cell, create_element, derive, on_mount, on_unmount, outer_html, render, reset_runtime, root_count,
    AttrValue, Child, DomNode, MutationKind, MutationObserver, Props, Tag,
};

#[test]
fn producer_swaps_text_without_gaps() {
    reset_runtime();
    let root = DomNode::element("div");
    let (flag, set_flag) = create_cell(true);
    render(&root, Child::producer(move || if flag.get() { "a" } else { "b" })).unwrap();

    let observer = MutationObserver::new(MutationKind::CHILD_LIST);
    observer.observe(&root);

    assert_eq!(root.child_count(), 1);
    assert_eq!(root.text_content(), "a");

    set_flag.set(false);
    assert_eq!(root.child_count(), 1);
    assert_eq!(root.text_content(), "b");

    let records = observer.take_records();
    assert_eq!(records.len(), 1, "one replace, not a remove plus an insert");
    assert_eq!(records[0].added.len(), 1);
    assert_eq!(records[0].removed.len(), 1);
}

#[test]
fn three_to_two_removes_only_the_tail() {
    reset_runtime();
    let root = DomNode::element("ul");
    let (items, set_items) = create_cell(vec!["x", "y", "z"]);
    render(&root, Child::producer(move || items.get())).unwrap();
    let before = root.children();

    let observer = MutationObserver::new(MutationKind::all());
    observer.observe(&root);
    set_items.set(vec!["x", "y"]);

    assert_eq!(root.children(), before[..2].to_vec());
    let records = observer.take_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].removed, vec![before[2].clone()]);
    assert!(records[0].added.is_empty());
}

#[test]
fn content_to_nothing_and_back() {
    reset_runtime();
    let root = DomNode::element("div");
    let (items, set_items) = create_cell(vec![1, 2]);
    render(&root, Child::producer(move || items.get())).unwrap();
    root.append_child(&DomNode::text("|")).unwrap();

    set_items.set(vec![]);
    assert_eq!(root.text_content(), "|");
    assert_eq!(root.child_count(), 2, "placeholder keeps the position");

    set_items.set(vec![7]);
    assert_eq!(root.text_content(), "7|");
}

#[test]
fn nested_producers_update_independently() {
    reset_runtime();
    let root = DomNode::element("div");
    let (outer, set_outer) = create_cell("outer".to_string());
    let (inner, set_inner) = create_cell(0);

    let outer_runs = Rc::new(Cell::new(0));
    let outer_runs_clone = outer_runs.clone();
    render(
        &root,
        Child::producer(move || {
            outer_runs_clone.set(outer_runs_clone.get() + 1);
            let inner = inner.clone();
            vec![Child::from(outer.get()), Child::from(":"), Child::producer(move || inner.get())]
        }),
    )
    .unwrap();
    assert_eq!(root.text_content(), "outer:0");

    set_inner.set(5);
    assert_eq!(root.text_content(), "outer:5");
    assert_eq!(outer_runs.get(), 1, "inner change does not re-run the outer producer");

    set_outer.set("OUTER".to_string());
    assert_eq!(root.text_content(), "OUTER:5");

    set_inner.set(6);
    assert_eq!(root.text_content(), "OUTER:6");
}

#[test]
fn element_with_handlers_and_bindings() {
    reset_runtime();
    let root = DomNode::element("main");
    let (count, set_count) = create_cell(0);
    let parity = {
        let count = count.clone();
        derive(move || if count.get() % 2 == 0 { "even" } else { "odd" })
    };

    let button = create_element(
        "button",
        Props::new()
            .attr("class", AttrValue::dynamic(move || parity.get()))
            .attr("onclick", AttrValue::handler(move |_| set_count.update(|n| n + 1))),
        vec![Child::producer(move || count.get())],
    )
    .unwrap();
    render(&root, button).unwrap();

    assert_eq!(outer_html(&root), "<main><button class=\"even\">0</button></main>");

    let host = root.first_child().unwrap();
    host.dispatch_event("click");
    host.dispatch_event("click");
    host.dispatch_event("click");
    assert_eq!(outer_html(&root), "<main><button class=\"odd\">3</button></main>");
}

#[test]
fn component_lifecycle_hooks() {
    reset_runtime();
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let (page, set_page) = create_cell(1);

    let log_clone = log.clone();
    let view = Tag::component(move |_props: &Props, _children: &[Child]| {
        let n = page.get();
        let mounted = log_clone.clone();
        let unmounted = log_clone.clone();
        on_mount(move || mounted.borrow_mut().push(format!("mount {n}")));
        on_unmount(move || unmounted.borrow_mut().push(format!("unmount {n}")));
        Ok(format!("page {n}"))
    });

    let root = DomNode::element("div");
    let node = render(&root, create_element(view, Props::new(), vec![]).unwrap()).unwrap();
    set_page.set(2);
    assert_eq!(root.text_content(), "page 2");

    node.owner().expect("component node has an owner").dispose();
    assert_eq!(*log.borrow(), vec!["mount 1", "unmount 1", "mount 2", "unmount 2"]);

    set_page.set(3);
    assert_eq!(root.text_content(), "page 2", "disposed producer no longer updates");
}

#[test]
fn tampered_tree_is_tolerated() {
    reset_runtime();
    let root = DomNode::element("div");
    let (label, set_label) = create_cell("a");
    render(&root, Child::producer(move || label.get())).unwrap();

    // Someone removes our text node behind the renderer's back.
    root.first_child().unwrap().remove();

    set_label.set("b");
    assert_eq!(root.text_content(), "b");
}

#[test]
fn nested_producer_starting_empty_is_mounted() {
    reset_runtime();
    let root = DomNode::element("div");
    let (show, set_show) = create_cell(false);
    let (text, set_text) = create_cell(None::<&'static str>);

    render(
        &root,
        Child::producer(move || {
            if show.get() {
                let text = text.clone();
                Child::producer(move || text.get())
            } else {
                Child::Null
            }
        }),
    )
    .unwrap();

    set_show.set(true);
    assert_eq!(root.text_content(), "");

    set_text.set(Some("x"));
    assert_eq!(root.text_content(), "x", "inner producer is in the tree");

    set_show.set(false);
    assert_eq!(root.text_content(), "");
    assert_eq!(root.child_count(), 1, "one placeholder left behind");
}

#[test]
fn dropped_elements_release_their_bindings() {
    reset_runtime();
    let (title, set_title) = create_cell("a".to_string());

    for _ in 0..1000 {
        let title = title.clone();
        let div = create_element("div", Props::new().attr("title", AttrValue::dynamic(move || title.get())), vec![])
            .unwrap();
        drop(div);
    }

    assert_eq!(root_count(), 0);
    assert_eq!(title.subscriber_count(), 0);
    set_title.set("b".to_string());
}

#[test]
fn dropped_root_stops_its_producers() {
    reset_runtime();
    let (count, set_count) = create_cell(0);
    let runs = Rc::new(Cell::new(0));

    {
        let root = DomNode::element("div");
        let reader = count.clone();
        let runs_clone = runs.clone();
        render(
            &root,
            Child::producer(move || {
                runs_clone.set(runs_clone.get() + 1);
                reader.get()
            }),
        )
        .unwrap();
        set_count.set(1);
        assert_eq!(root.text_content(), "1", "root keeps the producer alive");
    }

    assert_eq!(count.subscriber_count(), 0);
    set_count.set(2);
    assert_eq!(runs.get(), 2);
}

#[test]
fn failed_patch_keeps_unmount_hooks() {
    reset_runtime();
    let outer = DomNode::element("section");
    let root = DomNode::element("div");
    outer.append_child(&root).unwrap();

    let unmounted = Rc::new(Cell::new(0));
    let (step, set_step) = create_cell(0);
    let unmounted_clone = unmounted.clone();
    let ancestor = outer.downgrade();
    let node = render(
        &root,
        Child::producer(move || match step.get() {
            0 => {
                let unmounted = unmounted_clone.clone();
                on_unmount(move || unmounted.set(unmounted.get() + 1));
                Child::from("first")
            }
            // An ancestor of the mount point cannot be inserted under it.
            1 => ancestor.upgrade().map_or(Child::Null, Child::Dom),
            _ => Child::from("third"),
        }),
    )
    .unwrap();

    set_step.set(1);
    assert_eq!(root.text_content(), "first");
    assert_eq!(unmounted.get(), 0, "first build is still on screen");

    set_step.set(2);
    assert_eq!(root.text_content(), "third");
    assert_eq!(unmounted.get(), 1, "unmounted once it was actually replaced");

    node.owner().expect("producer node has an owner").dispose();
    assert_eq!(unmounted.get(), 1);
}
