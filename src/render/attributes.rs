//! Attribute assignment.
//!
//! [`set_attribute`] decides what an attribute means from its name and the
//! shape of its value, in this order:
//!
//! | name / value                   | effect                               |
//! |--------------------------------|--------------------------------------|
//! | known `on*` handler name       | event listener for the rest of name  |
//! | `ref`                          | callback receives the element        |
//! | [`AttrValue::Dynamic`]         | reactive binding re-applying value   |
//! | [`AttrValue::Style`]           | merge into inline style              |
//! | `true` / `false`               | `name="name"` / removed              |
//! | [`AttrValue::Null`]            | nothing                              |
//! | anything else                  | stringified value                    |

use std::fmt;
use std::rc::Rc;

use crate::config::with_config;
use crate::dom::{escape_html, DomNode, Event, Listener};
use crate::error::{Error, Result};
use crate::reactive::run_reactive_unrooted;

/// Callback receiving the element an attribute was set on.
pub type RefCallback = Rc<dyn Fn(&DomNode)>;

/// Function recomputing an attribute value.
pub type Binding = Rc<dyn Fn() -> AttrValue>;

/// An attribute value.
#[derive(Clone)]
pub enum AttrValue {
    /// No value; assignment does nothing.
    Null,
    /// Presence attribute.
    Bool(bool),
    /// String value.
    Text(String),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Inline style properties, merged key by key.
    Style(Vec<(String, String)>),
    /// Event handler for an `on*` attribute.
    Handler(Listener),
    /// Element callback for `ref`.
    Ref(RefCallback),
    /// Value recomputed whenever the cells it reads change.
    Dynamic(Binding),
}

impl AttrValue {
    /// An event handler.
    pub fn handler(f: impl Fn(&Event) + 'static) -> Self {
        AttrValue::Handler(Rc::new(f))
    }

    /// A `ref` callback.
    pub fn reference(f: impl Fn(&DomNode) + 'static) -> Self {
        AttrValue::Ref(Rc::new(f))
    }

    /// A reactive value.
    pub fn dynamic<F, V>(f: F) -> Self
    where
        F: Fn() -> V + 'static,
        V: Into<AttrValue>,
    {
        AttrValue::Dynamic(Rc::new(move || f().into()))
    }

    /// Inline style from property/value pairs.
    pub fn style<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        AttrValue::Style(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    fn shape(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Text(_) => "text",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Style(_) => "style",
            AttrValue::Handler(_) => "handler",
            AttrValue::Ref(_) => "ref",
            AttrValue::Dynamic(_) => "dynamic",
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "Bool({b})"),
            AttrValue::Text(text) => write!(f, "Text({text:?})"),
            AttrValue::Int(n) => write!(f, "Int({n})"),
            AttrValue::Float(n) => write!(f, "Float({n})"),
            AttrValue::Style(entries) => f.debug_tuple("Style").field(entries).finish(),
            other => f.write_str(other.shape()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        AttrValue::Text(text.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        AttrValue::Text(text)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Int(i64::from(n))
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Int(i64::from(n))
    }
}

impl From<usize> for AttrValue {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or_else(|_| AttrValue::Text(n.to_string()), AttrValue::Int)
    }
}

impl From<u64> for AttrValue {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| AttrValue::Text(n.to_string()), AttrValue::Int)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Float(n)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}

fn invalid(name: &str, reason: &'static str) -> Error {
    Error::InvalidAttribute {
        name: name.to_string(),
        reason,
    }
}

/// Assign `value` to the attribute `name` of `element`.
///
/// # Errors
///
/// [`Error::InvalidAttribute`] when the value shape does not fit the name
/// (a handler on a name that is not an event, a non-callback `ref`), and
/// [`Error::Dom`] when `element` is a text node.
pub fn set_attribute(element: &DomNode, name: &str, value: AttrValue) -> Result<()> {
    if is_handler_name(name) {
        return match value {
            AttrValue::Handler(listener) => {
                let event = name[2..].to_ascii_lowercase();
                element.add_event_listener(&event, listener)?;
                Ok(())
            }
            AttrValue::Null => Ok(()),
            _ => Err(invalid(name, "expected an event handler")),
        };
    }

    if name == "ref" {
        return match value {
            AttrValue::Ref(callback) => {
                callback(element);
                Ok(())
            }
            AttrValue::Null => Ok(()),
            _ => Err(invalid(name, "expected an element callback")),
        };
    }

    match value {
        AttrValue::Dynamic(binding) => {
            bind(element, name, binding);
            Ok(())
        }
        other => apply_static(element, name, other),
    }
}

fn is_handler_name(name: &str) -> bool {
    name.len() > 2
        && name.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
        && with_config(|config| config.is_event_handler(name))
}

/// Re-apply `binding` to the attribute whenever what it reads changes.
///
/// The element keeps the binding alive; the binding only refers back to it
/// weakly, so dropping the element stops the binding.
fn bind(element: &DomNode, name: &str, binding: Binding) {
    let weak = element.downgrade();
    let attr = name.to_string();

    let context = run_reactive_unrooted(format!("attr:{name}"), move || {
        let Some(element) = weak.upgrade() else {
            return;
        };
        let value = binding();
        if let Err(err) = apply_static(&element, &attr, value) {
            tracing::error!(%err, attribute = %attr, "attribute binding failed");
        }
    });
    element.retain(context);
}

fn apply_static(element: &DomNode, name: &str, value: AttrValue) -> Result<()> {
    match value {
        AttrValue::Style(entries) => {
            for (property, value) in &entries {
                element.set_style_property(property, value)?;
            }
        }
        AttrValue::Bool(true) => element.set_attribute(name, name)?,
        AttrValue::Bool(false) => element.remove_attribute(name)?,
        AttrValue::Null => {}
        AttrValue::Text(text) => set_string(element, name, &text)?,
        AttrValue::Int(n) => set_string(element, name, &n.to_string())?,
        AttrValue::Float(n) => set_string(element, name, &n.to_string())?,
        AttrValue::Handler(_) => return Err(invalid(name, "event handler on a name that is not a known event")),
        AttrValue::Ref(_) => return Err(invalid(name, "element callback on a name other than `ref`")),
        AttrValue::Dynamic(_) => return Err(invalid(name, "binding returned another binding")),
    }
    Ok(())
}

fn set_string(element: &DomNode, name: &str, value: &str) -> Result<()> {
    if with_config(|config| config.escape_attribute_values) {
        element.set_attribute(name, &escape_html(value))?;
    } else {
        element.set_attribute(name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{reset_config, set_config, Config};
    use crate::reactive::{create_cell, reset_runtime};
    use std::cell::Cell;

    #[test]
    fn test_boolean_presence() {
        reset_runtime();
        let input = DomNode::element("input");
        set_attribute(&input, "disabled", true.into()).unwrap();
        assert_eq!(input.get_attribute("disabled").as_deref(), Some("disabled"));

        set_attribute(&input, "disabled", false.into()).unwrap();
        assert!(!input.has_attribute("disabled"));
    }

    #[test]
    fn test_style_merges() {
        reset_runtime();
        let el = DomNode::element("div");
        set_attribute(&el, "style", AttrValue::style([("color", "red")])).unwrap();
        set_attribute(&el, "style", AttrValue::style([("margin", "0")])).unwrap();

        assert_eq!(el.style_property("color").as_deref(), Some("red"));
        assert_eq!(el.style_property("margin").as_deref(), Some("0"));
    }

    #[test]
    fn test_null_is_noop() {
        reset_runtime();
        let el = DomNode::element("div");
        set_attribute(&el, "title", "keep".into()).unwrap();
        set_attribute(&el, "title", AttrValue::Null).unwrap();
        assert_eq!(el.get_attribute("title").as_deref(), Some("keep"));
    }

    #[test]
    fn test_handler_case_insensitive() {
        reset_runtime();
        let button = DomNode::element("button");
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();
        set_attribute(&button, "onClick", AttrValue::handler(move |_| clicks_clone.set(clicks_clone.get() + 1))).unwrap();

        button.dispatch_event("click");
        assert_eq!(clicks.get(), 1);
        assert!(!button.has_attribute("onClick"));
    }

    #[test]
    fn test_unknown_on_name_is_plain_attribute() {
        reset_runtime();
        let el = DomNode::element("div");
        set_attribute(&el, "onion", "layers".into()).unwrap();
        assert_eq!(el.get_attribute("onion").as_deref(), Some("layers"));

        let err = set_attribute(&el, "onion", AttrValue::handler(|_| {})).unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { .. }));
    }

    #[test]
    fn test_ref_receives_element() {
        reset_runtime();
        let el = DomNode::element("canvas");
        let seen = Rc::new(Cell::new(false));
        let seen_clone = seen.clone();
        let expected = el.clone();
        set_attribute(&el, "ref", AttrValue::reference(move |node| seen_clone.set(*node == expected))).unwrap();
        assert!(seen.get());

        assert!(set_attribute(&el, "ref", "oops".into()).is_err());
    }

    #[test]
    fn test_dynamic_binding() {
        reset_runtime();
        let el = DomNode::element("div");
        let (class, set_class) = create_cell("a".to_string());
        set_attribute(&el, "class", AttrValue::dynamic(move || class.get())).unwrap();
        assert_eq!(el.get_attribute("class").as_deref(), Some("a"));

        set_class.set("b".to_string());
        assert_eq!(el.get_attribute("class").as_deref(), Some("b"));
    }

    #[test]
    fn test_binding_lives_with_its_element() {
        reset_runtime();
        let (class, set_class) = create_cell("a".to_string());
        let runs = Rc::new(Cell::new(0));

        let el = DomNode::element("div");
        let reader = class.clone();
        let runs_clone = runs.clone();
        let binding = AttrValue::dynamic(move || {
            runs_clone.set(runs_clone.get() + 1);
            reader.get()
        });
        set_attribute(&el, "class", binding).unwrap();
        assert_eq!(el.retained_count(), 1);
        assert_eq!(crate::reactive::root_count(), 0);

        drop(el);
        assert_eq!(class.subscriber_count(), 0);
        set_class.set("b".to_string());
        assert_eq!(runs.get(), 1, "binding of a dropped element never re-runs");
    }

    #[test]
    fn test_large_unsigned_values_are_exact() {
        reset_runtime();
        let el = DomNode::element("data");
        set_attribute(&el, "value", u64::MAX.into()).unwrap();
        assert_eq!(el.get_attribute("value").as_deref(), Some("18446744073709551615"));

        set_attribute(&el, "value", 7usize.into()).unwrap();
        assert_eq!(el.get_attribute("value").as_deref(), Some("7"));
    }

    #[test]
    fn test_escaping_policy() {
        reset_runtime();
        let el = DomNode::element("a");
        set_attribute(&el, "title", "<b>".into()).unwrap();
        assert_eq!(el.get_attribute("title").as_deref(), Some("<b>"));

        set_config(Config::default().with_escaping(true));
        set_attribute(&el, "title", "<b>".into()).unwrap();
        assert_eq!(el.get_attribute("title").as_deref(), Some("&lt;b&gt;"));
        reset_config();
    }

    #[test]
    fn test_text_node_is_rejected() {
        reset_runtime();
        let text = DomNode::text("t");
        assert!(matches!(set_attribute(&text, "id", "x".into()), Err(Error::Dom(_))));
    }
}
