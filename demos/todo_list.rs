//! Todo List Example - components, list reconciliation and lifecycle hooks
//!
//! A `TodoList` component renders one `<li>` per item. Adding, removing and
//! clearing items patches the list in place; a mutation observer reports how
//! many host nodes each step touched.
//!
//! Run with: RUST_LOG=spark_dom=debug cargo run --example todo_list

use spark_dom::{
    create_cell, create_element, on_mount, on_unmount, outer_html, render, Child, DomNode, MutationKind,
    MutationObserver, Props, Tag,
};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> spark_dom::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .try_init();

    println!("=== spark-dom Todo List Example ===\n");

    let (todos, set_todos) = create_cell(vec!["write docs".to_string(), "write code".to_string()]);

    let todo_list = Tag::component(move |props: &Props, _children: &[Child]| {
        let items = todos.get();
        let title = props.text("title").unwrap_or_default();

        let count = items.len();
        on_mount(move || println!("  [mounted with {count} items]"));
        on_unmount(move || println!("  [unmounting build with {count} items]"));

        let rows = items
            .into_iter()
            .map(|item| create_element("li", Props::new(), vec![Child::from(item)]).map(Child::from))
            .collect::<spark_dom::Result<Vec<Child>>>()?;

        Ok(vec![
            Child::Node(create_element("h2", Props::new(), vec![Child::from(title)])?),
            Child::Node(create_element("ul", Props::new().attr("class", "todos"), vec![Child::List(rows)])?),
        ])
    });

    let root = DomNode::element("main");
    let observer = MutationObserver::new(MutationKind::all());
    observer.observe(&root);

    render(&root, create_element(todo_list, Props::new().attr("title", "Today"), vec![])?)?;
    report("initial", &root, &observer);

    set_todos.update(|todos| {
        let mut next = todos.clone();
        next.push("ship it".to_string());
        next
    });
    report("added", &root, &observer);

    set_todos.update(|todos| todos[..1].to_vec());
    report("trimmed", &root, &observer);

    set_todos.set(Vec::new());
    report("cleared", &root, &observer);

    Ok(())
}

fn report(step: &str, root: &DomNode, observer: &MutationObserver) {
    let records = observer.take_records();
    println!("{step}: {} mutation(s)\n  {}", records.len(), outer_html(root));
}
