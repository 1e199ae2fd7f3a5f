//! Runtime settings.
//!
//! Settings are thread-local, like every other piece of runtime state in this
//! crate. They control how [`set_attribute`](crate::render::set_attribute)
//! treats attribute values and which `on*` names count as event handlers.

use std::cell::RefCell;
use std::collections::BTreeSet;

/// Global event handler names recognised out of the box.
pub const DEFAULT_EVENT_HANDLERS: &[&str] = &[
    "onabort", "onanimationend", "onanimationiteration", "onanimationstart",
    "onauxclick", "onbeforeinput", "onblur", "oncancel", "oncanplay",
    "oncanplaythrough", "onchange", "onclick", "onclose", "oncontextmenu",
    "oncopy", "oncuechange", "oncut", "ondblclick", "ondrag", "ondragend",
    "ondragenter", "ondragleave", "ondragover", "ondragstart", "ondrop",
    "ondurationchange", "onemptied", "onended", "onerror", "onfocus",
    "onfocusin", "onfocusout", "onformdata", "onfullscreenchange",
    "onfullscreenerror", "ongotpointercapture", "oninput", "oninvalid",
    "onkeydown", "onkeypress", "onkeyup", "onload", "onloadeddata",
    "onloadedmetadata", "onloadstart", "onlostpointercapture", "onmousedown",
    "onmouseenter", "onmouseleave", "onmousemove", "onmouseout", "onmouseover",
    "onmouseup", "onpaste", "onpause", "onplay", "onplaying", "onpointercancel",
    "onpointerdown", "onpointerenter", "onpointerleave", "onpointermove",
    "onpointerout", "onpointerover", "onpointerup", "onprogress",
    "onratechange", "onreset", "onresize", "onscroll", "onscrollend",
    "onsecuritypolicyviolation", "onseeked", "onseeking", "onselect",
    "onselectionchange", "onselectstart", "onslotchange", "onstalled",
    "onsubmit", "onsuspend", "ontimeupdate", "ontoggle", "ontouchcancel",
    "ontouchend", "ontouchmove", "ontouchstart", "ontransitioncancel",
    "ontransitionend", "ontransitionrun", "ontransitionstart",
    "onvolumechange", "onwaiting", "onwheel",
];

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTML-escape attribute values before assigning them.
    ///
    /// Off by default: values are stored verbatim and escaping happens when
    /// the tree is serialized.
    pub escape_attribute_values: bool,

    /// Lowercase `on*` names treated as event handlers.
    pub event_handlers: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escape_attribute_values: false,
            event_handlers: DEFAULT_EVENT_HANDLERS.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

impl Config {
    /// Enable or disable attribute value escaping.
    #[must_use]
    pub fn with_escaping(mut self, enabled: bool) -> Self {
        self.escape_attribute_values = enabled;
        self
    }

    /// Register an extra event handler name (e.g. a custom element event).
    ///
    /// The `on` prefix is added when missing.
    #[must_use]
    pub fn with_event_handler(mut self, name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        let name = if name.starts_with("on") { name } else { format!("on{name}") };
        self.event_handlers.insert(name);
        self
    }

    /// Whether `name` (any case) is a known event handler name.
    pub fn is_event_handler(&self, name: &str) -> bool {
        self.event_handlers.contains(&name.to_ascii_lowercase())
    }
}

// =============================================================================
// Thread-local settings
// =============================================================================

thread_local! {
    static CONFIG: RefCell<Config> = RefCell::new(Config::default());
}

/// Get a copy of the current settings.
pub fn config() -> Config {
    CONFIG.with(|c| c.borrow().clone())
}

/// Replace the current settings.
pub fn set_config(config: Config) {
    tracing::debug!(escape = config.escape_attribute_values, "config replaced");
    CONFIG.with(|c| *c.borrow_mut() = config);
}

/// Read the current settings without cloning them.
pub fn with_config<R>(f: impl FnOnce(&Config) -> R) -> R {
    CONFIG.with(|c| f(&c.borrow()))
}

/// Restore the default settings.
pub fn reset_config() {
    CONFIG.with(|c| *c.borrow_mut() = Config::default());
}
