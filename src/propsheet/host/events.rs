use std::rc::Rc;

/// Handle returned by [`Listeners::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An ordered list of callbacks.
///
/// Callers take a [`snapshot`](Listeners::snapshot) before invoking, so a
/// callback may subscribe or unsubscribe without invalidating the iteration.
pub struct Listeners<F: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<F>)>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> Listeners<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, callback: Rc<F>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries.iter().map(|(_, cb)| Rc::clone(cb)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_on_off() {
        let hits = Rc::new(Cell::new(0));
        let mut listeners: Listeners<dyn Fn()> = Listeners::new();

        let counter = Rc::clone(&hits);
        let id = listeners.on(Rc::new(move || counter.set(counter.get() + 1)));
        for cb in listeners.snapshot() {
            cb();
        }
        assert_eq!(hits.get(), 1);

        assert!(listeners.off(id));
        assert!(!listeners.off(id));
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut listeners: Listeners<dyn Fn()> = Listeners::new();
        let a = listeners.on(Rc::new(|| {}));
        let b = listeners.on(Rc::new(|| {}));
        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);
    }
}
