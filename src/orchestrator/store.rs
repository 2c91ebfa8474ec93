//! Observable state holder
//!
//! A [`Store`] owns one state value. Transitions build the next state on a
//! clone and [`commit`](Store::commit) it; subscribers run only when the
//! committed state differs from the previous one.

type Subscriber<S> = Box<dyn FnMut(&S)>;

pub struct Store<S> {
    state: S,
    subscribers: Vec<Subscriber<S>>,
}

impl<S: Clone + PartialEq> Store<S> {
    pub fn new(state: S) -> Self {
        Store {
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &S {
        &self.state
    }

    pub fn draft(&self) -> S {
        self.state.clone()
    }

    /// Replace the state with `next`. Returns whether anything changed.
    pub fn commit(&mut self, next: S) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }
        true
    }

    pub fn update(&mut self, f: impl FnOnce(&mut S)) -> bool {
        let mut next = self.draft();
        f(&mut next);
        self.commit(next)
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&S) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribers_see_changes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = Store::new(0);
        let sink = Rc::clone(&seen);
        store.subscribe(move |n: &i32| sink.borrow_mut().push(*n));

        assert!(store.update(|n| *n += 1));
        assert!(!store.update(|n| *n += 0));
        assert!(store.commit(5));
        assert_eq!(*seen.borrow(), vec![1, 5]);
        assert_eq!(*store.get(), 5);
    }
}
