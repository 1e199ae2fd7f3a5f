//! Counter Example - cells, a derived value and event handlers
//!
//! Builds a button whose label and class follow a counter, clicks it a few
//! times and prints the serialized tree after each click.
//!
//! Run with: RUST_LOG=spark_dom=trace cargo run --example counter

use spark_dom::{
    create_cell, create_element, derive, outer_html, render, AttrValue, Child, DomNode, Props,
};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> spark_dom::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .try_init();

    println!("=== spark-dom Counter Example ===\n");

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
        vec![Child::from("clicked "), Child::producer(move || count.get()), Child::from(" times")],
    )?;

    let root = DomNode::element("main");
    render(&root, button)?;
    println!("initial:  {}", outer_html(&root));

    let Some(host) = root.first_child() else {
        return Ok(());
    };
    for click in 1..=3 {
        host.dispatch_event("click");
        println!("click {click}:  {}", outer_html(&root));
    }

    Ok(())
}
