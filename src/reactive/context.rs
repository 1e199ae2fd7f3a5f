//! Reactive contexts - the active-context stack and context ownership.
//!
//! A [`Context`] is one reactive computation. While its closure runs it sits
//! on top of the thread's active-context stack, and every cell read in that
//! window subscribes it. Entering and leaving the stack goes through an RAII
//! guard, so a panicking closure still restores whatever was active before.
//!
//! Contexts created while another context runs are owned by it. When the
//! owner re-runs, everything it created during its previous run is disposed
//! first; that is how replaced UI stops reacting.
//!
//! A top-level [`run_reactive`] context is a runtime root and lives until it
//! is disposed or [`reset_runtime`] is called. Producers and attribute
//! bindings created at top level are not roots: the node or element they
//! render into holds them, and they stop when it is dropped.
//!
//! A context notified while it is already running is not re-entered. The
//! notification marks it pending and the outer run repeats once the closure
//! returns, until a run ends with nothing pending.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier of a context, unique per thread.
pub type ContextId = u64;

type Closure = Rc<RefCell<dyn FnMut()>>;

/// Back-to-back re-runs of one context before the loop is cut off.
const MAX_RERUNS: usize = 100;

// =============================================================================
// Runtime State
// =============================================================================

thread_local! {
    /// Stack of active contexts. `None` entries come from `untracked`.
    static ACTIVE: RefCell<Vec<Option<Context>>> = const { RefCell::new(Vec::new()) };

    /// Contexts created while nothing was active.
    static ROOTS: RefCell<Vec<Context>> = const { RefCell::new(Vec::new()) };

    /// Next context id.
    static NEXT_ID: Cell<ContextId> = const { Cell::new(1) };
}

fn next_id() -> ContextId {
    NEXT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    })
}

/// Keeps an entry on the active stack for as long as it lives.
struct ActiveGuard;

impl ActiveGuard {
    fn enter(context: Option<Context>) -> Self {
        ACTIVE.with(|stack| stack.borrow_mut().push(context));
        ActiveGuard
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Marks a context as running; cleared on drop even when unwinding.
struct RunningGuard<'a>(&'a ContextInner);

impl<'a> RunningGuard<'a> {
    fn enter(inner: &'a ContextInner) -> Self {
        inner.running.set(true);
        RunningGuard(inner)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.running.set(false);
        self.0.pending.set(false);
    }
}

// =============================================================================
// Context
// =============================================================================

struct ContextInner {
    id: ContextId,
    label: Option<String>,
    closure: RefCell<Option<Closure>>,
    parent: Option<Weak<ContextInner>>,
    /// Contexts created during the latest run.
    owned: RefCell<Vec<Context>>,
    /// Callbacks run before the next run and on dispose.
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    /// Callbacks run on dispose only.
    dispose_hooks: RefCell<Vec<Box<dyn FnOnce()>>>,
    running: Cell<bool>,
    /// Notified during the current run; run again when it returns.
    pending: Cell<bool>,
    disposed: Cell<bool>,
}

/// Handle to one reactive computation.
#[derive(Clone)]
pub struct Context(Rc<ContextInner>);

/// Non-owning reference held by cells.
#[derive(Clone)]
pub(crate) struct WeakContext(Weak<ContextInner>);

impl WeakContext {
    pub(crate) fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(Context)
    }
}

impl Context {
    /// Create a context with no closure, owned by the active context (or the
    /// runtime roots when nothing is active).
    pub(crate) fn detached(label: Option<String>) -> Context {
        Self::create(label, true)
    }

    /// Like [`detached`](Context::detached), but a top-level context is not
    /// registered as a root. The caller keeps it alive.
    pub(crate) fn unrooted(label: Option<String>) -> Context {
        Self::create(label, false)
    }

    fn create(label: Option<String>, root: bool) -> Context {
        let parent = current_context();
        let context = Context(Rc::new(ContextInner {
            id: next_id(),
            label,
            closure: RefCell::new(None),
            parent: parent.as_ref().map(|p| Rc::downgrade(&p.0)),
            owned: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            dispose_hooks: RefCell::new(Vec::new()),
            running: Cell::new(false),
            pending: Cell::new(false),
            disposed: Cell::new(false),
        }));

        match parent {
            Some(parent) => parent.0.owned.borrow_mut().push(context.clone()),
            None if root => ROOTS.with(|roots| roots.borrow_mut().push(context.clone())),
            None => {}
        }

        context
    }

    /// Install the recomputation closure.
    pub(crate) fn set_closure(&self, closure: impl FnMut() + 'static) {
        let closure: Closure = Rc::new(RefCell::new(closure));
        *self.0.closure.borrow_mut() = Some(closure);
    }

    /// Run `f` with this context on top of the active stack.
    pub(crate) fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        let _active = ActiveGuard::enter(Some(self.clone()));
        f()
    }

    /// Run (or re-run) the closure.
    ///
    /// Disposed contexts never run. A context that is already running is not
    /// re-entered: it is marked pending and runs again right after the
    /// current run returns.
    pub(crate) fn execute(&self) {
        let inner = &*self.0;
        if inner.disposed.get() {
            return;
        }
        if inner.running.get() {
            tracing::trace!(id = inner.id, label = ?inner.label, "context notified while running; re-run deferred");
            inner.pending.set(true);
            return;
        }

        let _running = RunningGuard::enter(inner);
        for run in 1..=MAX_RERUNS {
            self.release_previous_run();
            // Writes made by cleanups are picked up by the run below.
            inner.pending.set(false);

            let Some(closure) = inner.closure.borrow().clone() else {
                return;
            };

            tracing::trace!(id = inner.id, label = ?inner.label, run, "context run");
            {
                let _active = ActiveGuard::enter(Some(self.clone()));
                (&mut *closure.borrow_mut())();
            }

            if !inner.pending.get() || inner.disposed.get() {
                return;
            }
        }

        tracing::warn!(
            id = inner.id,
            label = ?inner.label,
            limit = MAX_RERUNS,
            "context keeps invalidating itself; giving up until the next change"
        );
    }

    /// Dispose contexts owned by the previous run and run its cleanups.
    fn release_previous_run(&self) {
        let owned = std::mem::take(&mut *self.0.owned.borrow_mut());
        for child in owned {
            child.dispose();
        }

        let cleanups = std::mem::take(&mut *self.0.cleanups.borrow_mut());
        for cleanup in cleanups {
            cleanup();
        }
    }

    /// Stop this context and everything it owns. Idempotent.
    pub fn dispose(&self) {
        if self.0.disposed.replace(true) {
            return;
        }
        tracing::trace!(id = self.0.id, label = ?self.0.label, "context disposed");

        self.release_previous_run();
        self.0.closure.borrow_mut().take();

        let hooks = std::mem::take(&mut *self.0.dispose_hooks.borrow_mut());
        for hook in hooks {
            hook();
        }

        if self.0.parent.is_none() {
            let id = self.0.id;
            let _ = ROOTS.try_with(|roots| {
                if let Ok(mut roots) = roots.try_borrow_mut() {
                    roots.retain(|root| root.id() != id);
                }
            });
        }
    }

    /// Register a callback that runs once when this context is disposed.
    ///
    /// Unlike [`on_cleanup`], it does not fire when the context re-runs.
    /// Registering on an already disposed context runs the callback at once.
    pub fn on_dispose(&self, hook: impl FnOnce() + 'static) {
        if self.is_disposed() {
            hook();
            return;
        }
        self.0.dispose_hooks.borrow_mut().push(Box::new(hook));
    }

    /// Unique id of this context.
    pub fn id(&self) -> ContextId {
        self.0.id
    }

    /// Debug label given at creation, if any.
    pub fn label(&self) -> Option<&str> {
        self.0.label.as_deref()
    }

    /// The context that was active when this one was created.
    pub fn parent(&self) -> Option<Context> {
        self.0.parent.as_ref().and_then(Weak::upgrade).map(Context)
    }

    /// Whether [`dispose`](Context::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.0.disposed.get()
    }

    /// Whether the closure is on the call stack right now.
    pub fn is_running(&self) -> bool {
        self.0.running.get()
    }

    /// Number of contexts created during the latest run.
    pub fn owned_count(&self) -> usize {
        self.0.owned.borrow().len()
    }

    pub(crate) fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.0.id)
            .field("label", &self.0.label)
            .field("disposed", &self.0.disposed.get())
            .finish()
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Run `f` as a new reactive context.
///
/// The closure runs once, synchronously, before this returns. Afterwards it
/// re-runs whenever a cell it read changes.
///
/// ```ignore
/// let (count, set_count) = create_cell(0);
/// run_reactive(move || println!("count = {}", count.get()));
/// set_count.set(1); // prints "count = 1"
/// ```
pub fn run_reactive(f: impl FnMut() + 'static) -> Context {
    spawn(None, f)
}

/// Like [`run_reactive`], with a debug label carried into log events.
pub fn run_reactive_named(label: impl Into<String>, f: impl FnMut() + 'static) -> Context {
    spawn(Some(label.into()), f)
}

fn spawn(label: Option<String>, f: impl FnMut() + 'static) -> Context {
    let context = Context::detached(label);
    context.set_closure(f);
    context.execute();
    context
}

/// Run `f` as a context that is never a runtime root.
///
/// Nested in another context it is owned like any other. At top level the
/// returned handle is the only strong reference: dropping it stops the
/// context and unsubscribes it from every cell.
pub(crate) fn run_reactive_unrooted(label: impl Into<String>, f: impl FnMut() + 'static) -> Context {
    let context = Context::unrooted(Some(label.into()));
    context.set_closure(f);
    context.execute();
    context
}

/// The context currently collecting dependencies, if any.
pub fn current_context() -> Option<Context> {
    ACTIVE.with(|stack| stack.borrow().last().cloned().flatten())
}

/// Run `f` without tracking any reads.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let _active = ActiveGuard::enter(None);
    f()
}

/// Register a callback on the active context.
///
/// It runs right before the context's next run, or when it is disposed.
/// Outside a context the callback is dropped.
pub fn on_cleanup(cleanup: impl FnOnce() + 'static) {
    match current_context() {
        Some(context) => context.0.cleanups.borrow_mut().push(Box::new(cleanup)),
        None => tracing::warn!("on_cleanup called outside a reactive context; callback dropped"),
    }
}

/// Dispose every root context and clear the active stack (for testing).
pub fn reset_runtime() {
    let roots = ROOTS.with(|roots| std::mem::take(&mut *roots.borrow_mut()));
    for root in roots {
        root.dispose();
    }
    ACTIVE.with(|stack| stack.borrow_mut().clear());
}

/// Number of live root contexts.
pub fn root_count() -> usize {
    ROOTS.with(|roots| roots.borrow().len())
}
