//! Mount and unmount hooks for producer bodies.
//!
//! While a producer (or component) builds its output, hooks registered with
//! [`on_mount`] and [`on_unmount`] are collected for that build. The
//! producer runs the mount hooks once the build is in place and keeps the
//! unmount hooks until the build is replaced or the producer is disposed.

use std::cell::RefCell;

use crate::reactive::untracked;

pub(crate) type Hook = Box<dyn FnOnce()>;

/// Hooks collected during one build.
#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) mount: Vec<Hook>,
    pub(crate) unmount: Vec<Hook>,
}

thread_local! {
    static COLLECTORS: RefCell<Vec<Hooks>> = const { RefCell::new(Vec::new()) };
}

struct CollectGuard {
    finished: bool,
}

impl CollectGuard {
    fn push() -> Self {
        COLLECTORS.with(|stack| stack.borrow_mut().push(Hooks::default()));
        Self { finished: false }
    }

    fn finish(mut self) -> Hooks {
        self.finished = true;
        COLLECTORS.with(|stack| stack.borrow_mut().pop()).unwrap_or_default()
    }
}

impl Drop for CollectGuard {
    fn drop(&mut self) {
        if !self.finished {
            COLLECTORS.with(|stack| stack.borrow_mut().pop());
        }
    }
}

/// Run `f` and return the hooks it registered.
pub(crate) fn collect<R>(f: impl FnOnce() -> R) -> (R, Hooks) {
    let guard = CollectGuard::push();
    let result = f();
    (result, guard.finish())
}

/// Run hooks without tracking what they read.
pub(crate) fn run_hooks(hooks: Vec<Hook>) {
    if hooks.is_empty() {
        return;
    }
    untracked(|| {
        for hook in hooks {
            hook();
        }
    });
}

/// Run `f` after the current build is in place.
///
/// Outside a producer body `f` runs immediately.
pub fn on_mount(f: impl FnOnce() + 'static) {
    let pending = COLLECTORS.with(|stack| match stack.borrow_mut().last_mut() {
        Some(hooks) => {
            hooks.mount.push(Box::new(f));
            None
        }
        None => Some(f),
    });
    if let Some(f) = pending {
        f();
    }
}

/// Run `f` once, after the current build has been replaced in the host tree
/// (before the new build's mount hooks), or when its producer is disposed.
/// A replacement that fails to patch leaves the hook registered.
///
/// Outside a producer body the hook is dropped with a warning.
pub fn on_unmount(f: impl FnOnce() + 'static) {
    let registered = COLLECTORS.with(|stack| match stack.borrow_mut().last_mut() {
        Some(hooks) => {
            hooks.unmount.push(Box::new(f));
            true
        }
        None => false,
    });
    if !registered {
        tracing::warn!("on_unmount called outside a component body; hook dropped");
    }
}
