use crate::dispatcher::{Message, MessageFilter, WM_HOTKEY};
use crate::error::HotkeyError;
use crate::host::WindowHandle;
use crate::keys::{KeyCombination, MOD_NOREPEAT};
use crate::registry::RegistryInner;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Delivered to the subscriber when its hotkey fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyPressed {
    pub id: u16,
    pub keys: KeyCombination,
    pub target: WindowHandle,
}

type Handler = Box<dyn FnMut(&HotkeyPressed) -> bool>;

pub(crate) struct BindingState {
    pub(crate) id: u16,
    pub(crate) target: WindowHandle,
    pub(crate) keys: KeyCombination,
    pub(crate) suppress_auto_unregister: bool,
    registered: Cell<bool>,
    handler: RefCell<Option<Handler>>,
}

impl BindingState {
    pub(crate) fn new(
        id: u16,
        target: WindowHandle,
        keys: KeyCombination,
        suppress_auto_unregister: bool,
    ) -> Self {
        Self {
            id,
            target,
            keys,
            suppress_auto_unregister,
            registered: Cell::new(false),
            handler: RefCell::new(None),
        }
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.registered.get()
    }

    pub(crate) fn register(
        self: &Rc<Self>,
        registry: &RegistryInner,
    ) -> Result<(), HotkeyError> {
        if self.is_registered() {
            debug!("hotkey {} is already registered", self.id);
            return Err(HotkeyError::AlreadyRegistered(self.id));
        }
        if !self.keys.has_key() {
            debug!("hotkey {} has no base key", self.id);
            return Err(HotkeyError::MissingKey(self.id));
        }

        let mut modifiers = self.keys.hotkey_modifiers();
        if registry.options.no_repeat {
            modifiers |= MOD_NOREPEAT;
        }
        if let Err(reason) =
            registry
                .host
                .register_hotkey(self.target, self.id, modifiers, self.keys.key_code())
        {
            warn!("hotkey {} ({}) is unavailable, {reason}", self.id, self.keys);
            return Err(HotkeyError::Conflict {
                id: self.id,
                keys: self.keys,
                reason,
            });
        }

        let filter: Rc<dyn MessageFilter> = self.clone();
        registry.dispatcher.subscribe(&filter);
        self.registered.set(true);
        info!("hotkey {} ({}) registered", self.id, self.keys);
        Ok(())
    }

    pub(crate) fn unregister(self: &Rc<Self>, registry: &RegistryInner) {
        if !self.is_registered() {
            return;
        }
        // Cleared first so messages delivered during teardown are ignored.
        self.registered.set(false);

        let filter: Rc<dyn MessageFilter> = self.clone();
        registry.dispatcher.unsubscribe(&filter);

        match registry.host.unregister_hotkey(self.target, self.id) {
            Ok(()) => info!("hotkey {} ({}) unregistered", self.id, self.keys),
            Err(err) => debug!("hotkey {} unregister ignored, {err}", self.id),
        }
    }

    fn on_pressed(&self) -> bool {
        let event = HotkeyPressed {
            id: self.id,
            keys: self.keys,
            target: self.target,
        };
        match self.handler.try_borrow_mut() {
            Ok(mut handler) => match handler.as_mut() {
                Some(handler) => handler(&event),
                None => false,
            },
            Err(_) => {
                debug!("hotkey {} pressed while its handler is running", self.id);
                false
            }
        }
    }
}

impl MessageFilter for BindingState {
    fn pre_filter_message(&self, message: &Message) -> bool {
        self.is_registered()
            && message.message == WM_HOTKEY
            && message.wparam == self.id as usize
            && self.on_pressed()
    }
}

/// One global hotkey owned by the application.
///
/// Dropping the binding unregisters it from the OS (if needed) and removes it from
/// its registry.
pub struct HotkeyBinding {
    state: Rc<BindingState>,
    registry: Rc<RegistryInner>,
}

impl HotkeyBinding {
    pub(crate) fn new(state: Rc<BindingState>, registry: Rc<RegistryInner>) -> Self {
        Self { state, registry }
    }

    pub fn id(&self) -> u16 {
        self.state.id
    }

    pub fn target(&self) -> WindowHandle {
        self.state.target
    }

    pub fn keys(&self) -> KeyCombination {
        self.state.keys
    }

    pub fn is_registered(&self) -> bool {
        self.state.is_registered()
    }

    pub fn suppress_auto_unregister(&self) -> bool {
        self.state.suppress_auto_unregister
    }

    /// Sets the subscriber, replacing any previous one. It returns whether it handled
    /// the press.
    pub fn on_pressed<F>(&self, handler: F)
    where
        F: FnMut(&HotkeyPressed) -> bool + 'static,
    {
        match self.state.handler.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(Box::new(handler)),
            Err(_) => warn!("hotkey {} handler cannot be replaced while running", self.id()),
        }
    }

    pub fn try_register(&self) -> Result<(), HotkeyError> {
        self.state.register(&self.registry)
    }

    pub fn register(&self) -> bool {
        self.try_register().is_ok()
    }

    pub fn unregister(&self) {
        self.state.unregister(&self.registry)
    }

    /// Checks whether the combination is free by registering and releasing it.
    pub fn can_register(&self) -> bool {
        if self.register() {
            self.unregister();
            return true;
        }
        false
    }

    pub fn pre_filter_message(&self, message: &Message) -> bool {
        self.state.pre_filter_message(message)
    }

    pub fn dispose(self) {}
}

impl Drop for HotkeyBinding {
    fn drop(&mut self) {
        self.state.unregister(&self.registry);
        self.registry.remove(&self.state);
        debug!("hotkey {} disposed", self.state.id);
    }
}

impl std::fmt::Debug for HotkeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyBinding")
            .field("id", &self.state.id)
            .field("target", &self.state.target)
            .field("keys", &self.state.keys)
            .field("registered", &self.state.is_registered())
            .field("suppress_auto_unregister", &self.state.suppress_auto_unregister)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::dispatcher::{Message, MessageFilter, WM_HOTKEY};
    use crate::host::testing::FakeHost;
    use crate::host::WindowHandle;
    use crate::keys::{KeyCombination, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT};
    use crate::registry::{HotkeyRegistry, RegistryOptions};
    use crate::HotkeyError;

    use std::cell::Cell;
    use std::rc::Rc;

    const WINDOW: WindowHandle = WindowHandle(0x1234);

    fn ctrl_alt(code: u16) -> KeyCombination {
        KeyCombination::new(code).with_control().with_alt()
    }

    fn setup() -> (FakeHost, HotkeyRegistry) {
        let host = FakeHost::default();
        let registry = HotkeyRegistry::new(host.clone());
        (host, registry)
    }

    #[test]
    fn test_new_binding_is_unregistered() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x41)).unwrap();
        assert!(!binding.is_registered());
        assert!(!binding.suppress_auto_unregister());
        assert!(host.state().register_calls.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_decomposes_keys() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x41)).unwrap();
        assert!(binding.register());
        assert!(binding.is_registered());
        assert_eq!(
            host.state().active.get(&(WINDOW.0, binding.id())),
            Some(&(MOD_CONTROL | MOD_ALT, 0x41))
        );
        assert_eq!(registry.dispatcher().len(), 1);
    }

    #[test]
    fn test_register_no_repeat() {
        let host = FakeHost::default();
        let registry =
            HotkeyRegistry::with_options(host.clone(), RegistryOptions { no_repeat: true });
        let binding = registry
            .bind(WINDOW, KeyCombination::new(0x70).with_alt())
            .unwrap();
        assert!(binding.register());
        assert_eq!(
            host.state().active.get(&(WINDOW.0, binding.id())),
            Some(&(MOD_ALT | MOD_NOREPEAT, 0x70))
        );
    }

    #[test]
    fn test_register_twice() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x42)).unwrap();
        assert!(binding.register());
        assert!(matches!(
            binding.try_register(),
            Err(HotkeyError::AlreadyRegistered(_))
        ));
        assert!(binding.is_registered());
        assert_eq!(host.state().register_calls.len(), 1);
        assert_eq!(registry.dispatcher().len(), 1);
    }

    #[test]
    fn test_register_without_base_key() {
        let (host, registry) = setup();
        let combinations = [
            KeyCombination::NONE,
            KeyCombination::NONE.with_alt(),
            KeyCombination::NONE.with_control().with_shift(),
            KeyCombination::NONE.with_alt().with_control().with_shift(),
        ];
        for keys in combinations {
            let binding = registry.bind(WINDOW, keys).unwrap();
            assert!(matches!(
                binding.try_register(),
                Err(HotkeyError::MissingKey(_))
            ));
            assert!(!binding.is_registered());
        }
        assert!(host.state().register_calls.is_empty());
    }

    #[test]
    fn test_register_conflict() {
        let (host, registry) = setup();
        let first = registry.bind(WINDOW, ctrl_alt(0x43)).unwrap();
        let second = registry.bind(WINDOW, ctrl_alt(0x43)).unwrap();
        assert!(first.register());
        assert!(matches!(
            second.try_register(),
            Err(HotkeyError::Conflict { .. })
        ));
        assert!(!second.is_registered());
        assert_eq!(registry.dispatcher().len(), 1);
        assert_eq!(host.state().active.len(), 1);
    }

    #[test]
    fn test_unregister_when_not_registered() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x44)).unwrap();
        binding.unregister();
        binding.unregister();
        assert!(host.state().unregister_calls.is_empty());

        assert!(binding.register());
        binding.unregister();
        binding.unregister();
        assert!(!binding.is_registered());
        assert_eq!(host.unregister_count(binding.id()), 1);
        assert!(registry.dispatcher().is_empty());
    }

    #[test]
    fn test_can_register() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x45)).unwrap();
        assert!(binding.can_register());
        assert!(!binding.is_registered());
        assert!(host.state().active.is_empty());

        host.reject_key(0x45);
        assert!(!binding.can_register());
        assert!(!binding.is_registered());
    }

    #[test]
    fn test_pre_filter_message() {
        let (_host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x46)).unwrap();
        let calls = Rc::new(Cell::new(0));
        let calls_ = calls.clone();
        binding.on_pressed(move |event| {
            assert_eq!(event.keys, ctrl_alt(0x46));
            calls_.set(calls_.get() + 1);
            true
        });
        let id = binding.id();

        // not registered yet
        assert!(!binding.pre_filter_message(&Message::hotkey(WINDOW, id)));
        assert_eq!(calls.get(), 0);

        assert!(binding.register());
        assert!(!binding.pre_filter_message(&Message::hotkey(WINDOW, id + 1)));
        assert!(!binding.pre_filter_message(&Message::new(WINDOW, WM_HOTKEY + 1, id as usize, 0)));
        assert_eq!(calls.get(), 0);

        // payload must match the id exactly, not only in its low bits
        let high = Message::new(WINDOW, WM_HOTKEY, 0x1_0000 | id as usize, 0);
        assert!(!binding.pre_filter_message(&high));
        #[cfg(target_pointer_width = "64")]
        {
            let high = Message::new(WINDOW, WM_HOTKEY, (1usize << 32) | id as usize, 0);
            assert!(!binding.pre_filter_message(&high));
        }
        assert_eq!(calls.get(), 0);

        assert!(binding.pre_filter_message(&Message::hotkey(WINDOW, id)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_message_during_unregister_is_ignored() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x4a)).unwrap();
        let calls = Rc::new(Cell::new(0));
        let calls_ = calls.clone();
        binding.on_pressed(move |_| {
            calls_.set(calls_.get() + 1);
            true
        });
        assert!(binding.register());

        let state = Rc::downgrade(&binding.state);
        let delivered = Rc::new(Cell::new(None));
        let delivered_ = delivered.clone();
        host.on_unregister(move |id| {
            if let Some(state) = state.upgrade() {
                delivered_.set(Some(state.pre_filter_message(&Message::hotkey(WINDOW, id))));
            }
        });
        binding.unregister();

        assert_eq!(delivered.get(), Some(false));
        assert_eq!(calls.get(), 0);
        assert_eq!(host.unregister_count(binding.id()), 1);
    }

    #[test]
    fn test_nested_dispatch_to_running_handler() {
        let (_host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x4b)).unwrap();
        assert!(binding.register());
        let message = Message::hotkey(WINDOW, binding.id());

        let calls = Rc::new(Cell::new(0));
        let nested = Rc::new(Cell::new(None));
        let (calls_, nested_, registry_) = (calls.clone(), nested.clone(), registry.clone());
        binding.on_pressed(move |_| {
            calls_.set(calls_.get() + 1);
            nested_.set(Some(registry_.dispatch(&message)));
            true
        });

        assert!(registry.dispatch(&message));
        assert_eq!(calls.get(), 1);
        assert_eq!(nested.get(), Some(false));
    }

    #[test]
    fn test_handler_result_is_propagated() {
        let (_host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x47)).unwrap();
        assert!(binding.register());
        let message = Message::hotkey(WINDOW, binding.id());

        // no subscriber
        assert!(!binding.pre_filter_message(&message));

        binding.on_pressed(|_| false);
        assert!(!binding.pre_filter_message(&message));
        assert!(!registry.dispatch(&message));

        binding.on_pressed(|_| true);
        assert!(binding.pre_filter_message(&message));
        assert!(registry.dispatch(&message));
    }

    #[test]
    fn test_drop_registered_binding() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x48)).unwrap();
        let id = binding.id();
        assert!(binding.register());
        drop(binding);
        assert_eq!(host.unregister_count(id), 1);
        assert!(registry.is_empty());
        assert!(registry.dispatcher().is_empty());
        assert!(host.state().active.is_empty());
    }

    #[test]
    fn test_dispose_unregistered_binding() {
        let (host, registry) = setup();
        let binding = registry.bind(WINDOW, ctrl_alt(0x49)).unwrap();
        assert!(binding.register());
        binding.unregister();
        binding.dispose();
        assert_eq!(host.state().unregister_calls.len(), 1);
        assert!(registry.is_empty());
    }
}
