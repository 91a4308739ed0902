use crate::host::WindowHandle;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Posted to the target queue when a registered hotkey fires; `wparam` carries the id.
pub const WM_HOTKEY: u32 = 0x0312;

/// A queued UI message as retrieved by the host message loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Message {
    pub hwnd: WindowHandle,
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    pub fn new(hwnd: WindowHandle, message: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            hwnd,
            message,
            wparam,
            lparam,
        }
    }

    pub fn hotkey(hwnd: WindowHandle, id: u16) -> Self {
        Self::new(hwnd, WM_HOTKEY, id as usize, 0)
    }
}

/// Inspects messages before they are translated and dispatched.
pub trait MessageFilter {
    /// Returns true when the message is fully handled and must not be dispatched further.
    fn pre_filter_message(&self, message: &Message) -> bool;
}

/// Filter chain queried by the message loop once per incoming message.
///
/// Filters are held weakly; whoever subscribed them owns them.
#[derive(Default)]
pub struct MessageDispatcher {
    filters: RefCell<Vec<Weak<dyn MessageFilter>>>,
}

impl MessageDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, filter: &Rc<dyn MessageFilter>) {
        let mut filters = self.filters.borrow_mut();
        let ptr = filter_ptr(&Rc::downgrade(filter));
        if filters.iter().all(|v| filter_ptr(v) != ptr) {
            filters.push(Rc::downgrade(filter));
        }
    }

    pub fn unsubscribe(&self, filter: &Rc<dyn MessageFilter>) {
        let ptr = filter_ptr(&Rc::downgrade(filter));
        self.filters
            .borrow_mut()
            .retain(|v| v.strong_count() > 0 && filter_ptr(v) != ptr);
    }

    pub fn len(&self) -> usize {
        self.filters
            .borrow()
            .iter()
            .filter(|v| v.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offers `message` to every filter in subscription order, stopping at the first
    /// one that consumes it.
    pub fn dispatch(&self, message: &Message) -> bool {
        // Filters may (un)subscribe while running, so iterate over a snapshot.
        let snapshot: Vec<Rc<dyn MessageFilter>> = self
            .filters
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        snapshot.iter().any(|filter| filter.pre_filter_message(message))
    }
}

fn filter_ptr(filter: &Weak<dyn MessageFilter>) -> *const () {
    filter.as_ptr() as *const ()
}
