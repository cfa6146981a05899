//! Bookkeeping for things registered with the page that must be
//! unregistered before they are freed.

use std::cell::RefCell;

/// Something that can take itself back off the page.
pub trait Detach {
    fn detach(self);
}

/// Registrations owned by one handle. Everything still held is detached on
/// drop, so releasing a handle from JS without `destroy()` leaves nothing
/// pointing at freed closures.
pub struct Registry<L: Detach> {
    entries: RefCell<Vec<L>>,
}

impl<L: Detach> Default for Registry<L> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<L: Detach> Registry<L> {
    pub fn push(&self, entry: L) {
        self.entries.borrow_mut().push(entry);
    }

    /// Detach in registration order. Safe to call repeatedly.
    pub fn detach_all(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for entry in entries {
            entry.detach();
        }
    }
}

impl<L: Detach> Drop for Registry<L> {
    fn drop(&mut self) {
        self.detach_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct Recorded {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Detach for Recorded {
        fn detach(self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    fn registry(log: &Rc<RefCell<Vec<&'static str>>>) -> Registry<Recorded> {
        let registry = Registry::default();
        for name in ["mousemove", "click", "resize"] {
            registry.push(Recorded {
                name,
                log: Rc::clone(log),
            });
        }
        registry
    }

    #[test]
    fn dropping_detaches_everything() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = registry(&log);
        assert!(log.borrow().is_empty());
        drop(registry);
        assert_eq!(*log.borrow(), vec!["mousemove", "click", "resize"]);
    }

    #[test]
    fn explicit_detach_is_not_repeated_on_drop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = registry(&log);
        registry.detach_all();
        registry.detach_all();
        drop(registry);
        assert_eq!(log.borrow().len(), 3);
    }
}
