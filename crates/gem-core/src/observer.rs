//! Single-threaded observer lists with RAII subscription handles.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// A list of callbacks notified with `&T`.
pub struct Observers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            let cb: Callback<T> = Rc::new(RefCell::new(callback));
            reg.entries.push((id, cb));
            id
        };
        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(reg) = weak.upgrade() {
                    reg.borrow_mut().entries.retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    /// Call every registered callback. The list is snapshotted first, so
    /// callbacks may subscribe or drop subscriptions while being notified.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in snapshot {
            // A callback already on the stack is skipped rather than re-entered
            if let Ok(mut f) = cb.try_borrow_mut() {
                (&mut *f)(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`Observers::subscribe`]; dropping it unregisters the callback.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the callback registered for as long as the observer list lives.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
