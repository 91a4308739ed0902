//! Registry of every live hotkey binding.
//!
//! Everything here runs on the UI thread that pumps the message loop. The types are
//! built on `Rc` and are therefore neither `Send` nor `Sync`.

use crate::binding::{BindingState, HotkeyBinding};
use crate::dispatcher::{Message, MessageDispatcher};
use crate::error::HotkeyError;
use crate::host::{HotkeyHost, WindowHandle};
use crate::keys::KeyCombination;

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

/// Highest id an application may pass to `RegisterHotKey`.
pub const MAX_HOTKEY_ID: u16 = 0xBFFF;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Suppress auto-repeat notifications while the combination is held down.
    pub no_repeat: bool,
}

/// Sequential id source that wraps from `MAX_HOTKEY_ID` back to zero.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u16,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u16) -> Self {
        Self {
            next: next.min(MAX_HOTKEY_ID),
        }
    }

    pub fn next_id(&mut self) -> u16 {
        let id = self.next;
        self.next = if id >= MAX_HOTKEY_ID { 0 } else { id + 1 };
        id
    }

    /// Returns the next id for which `in_use` is false, or `None` after a full cycle.
    pub fn next_free<F>(&mut self, in_use: F) -> Option<u16>
    where
        F: Fn(u16) -> bool,
    {
        (0..=MAX_HOTKEY_ID).find_map(|_| {
            let id = self.next_id();
            (!in_use(id)).then_some(id)
        })
    }
}

pub(crate) struct RegistryInner {
    pub(crate) host: Box<dyn HotkeyHost>,
    pub(crate) options: RegistryOptions,
    pub(crate) dispatcher: MessageDispatcher,
    ids: RefCell<IdAllocator>,
    bindings: RefCell<Vec<Weak<BindingState>>>,
    enabled: Cell<bool>,
}

impl RegistryInner {
    fn live(&self) -> Vec<Rc<BindingState>> {
        self.bindings
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    pub(crate) fn remove(&self, state: &Rc<BindingState>) {
        let ptr = Rc::as_ptr(state);
        self.bindings
            .borrow_mut()
            .retain(|v| v.strong_count() > 0 && v.as_ptr() != ptr);
    }
}

/// Handle to a hotkey registry. Clones share the same registry.
#[derive(Clone)]
pub struct HotkeyRegistry {
    inner: Rc<RegistryInner>,
}

impl HotkeyRegistry {
    pub fn new<H: HotkeyHost + 'static>(host: H) -> Self {
        Self::with_options(host, RegistryOptions::default())
    }

    pub fn with_options<H: HotkeyHost + 'static>(host: H, options: RegistryOptions) -> Self {
        Self::with_allocator(host, options, IdAllocator::new())
    }

    pub fn with_allocator<H: HotkeyHost + 'static>(
        host: H,
        options: RegistryOptions,
        ids: IdAllocator,
    ) -> Self {
        let inner = RegistryInner {
            host: Box::new(host),
            options,
            dispatcher: MessageDispatcher::new(),
            ids: RefCell::new(ids),
            bindings: RefCell::new(Vec::new()),
            enabled: Cell::new(true),
        };
        Self {
            inner: Rc::new(inner),
        }
    }

    /// Creates an unregistered binding and adds it to the registry.
    pub fn bind(
        &self,
        target: WindowHandle,
        keys: KeyCombination,
    ) -> Result<HotkeyBinding, HotkeyError> {
        self.create(target, keys, false)
    }

    /// Like [`HotkeyRegistry::bind`], but the binding is skipped by
    /// [`HotkeyRegistry::unregister_all`].
    pub fn bind_persistent(
        &self,
        target: WindowHandle,
        keys: KeyCombination,
    ) -> Result<HotkeyBinding, HotkeyError> {
        self.create(target, keys, true)
    }

    fn create(
        &self,
        target: WindowHandle,
        keys: KeyCombination,
        suppress_auto_unregister: bool,
    ) -> Result<HotkeyBinding, HotkeyError> {
        let live: HashSet<u16> = self.inner.live().iter().map(|v| v.id).collect();
        let id = self
            .inner
            .ids
            .borrow_mut()
            .next_free(|id| live.contains(&id))
            .ok_or(HotkeyError::IdsExhausted)?;

        let state = Rc::new(BindingState::new(id, target, keys, suppress_auto_unregister));
        self.inner.bindings.borrow_mut().push(Rc::downgrade(&state));
        debug!("hotkey {id} ({keys}) created");
        Ok(HotkeyBinding::new(state, self.inner.clone()))
    }

    /// Registers every binding; failures are logged and do not stop the others.
    pub fn register_all(&self) {
        for state in self.inner.live() {
            let _ = state.register(&self.inner);
        }
    }

    /// Unregisters every binding that was not created with `bind_persistent`.
    pub fn unregister_all(&self) {
        for state in self.inner.live() {
            if !state.suppress_auto_unregister {
                state.unregister(&self.inner);
            }
        }
    }

    pub fn suspend(&self) {
        info!("hotkeys suspended");
        self.inner.enabled.set(false);
        self.unregister_all();
    }

    pub fn resume(&self) {
        info!("hotkeys resumed");
        self.inner.enabled.set(true);
        self.register_all();
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Offers a message from the loop to the registered bindings.
    /// Returns true when it was consumed and must not be dispatched further.
    pub fn dispatch(&self, message: &Message) -> bool {
        self.inner.dispatcher.dispatch(message)
    }

    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.inner.dispatcher
    }

    pub fn ids(&self) -> Vec<u16> {
        self.inner.live().iter().map(|v| v.id).collect()
    }

    pub fn contains(&self, id: u16) -> bool {
        self.inner.live().iter().any(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
