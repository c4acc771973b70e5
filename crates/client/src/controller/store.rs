use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

/// Single-writer state cell.
///
/// All mutations go through [`StateStore::update`], which runs the closure under
/// a mutex and then publishes the resulting snapshot to every subscriber. Readers
/// only ever see whole states, in the order the updates were applied.
#[derive(Debug)]
pub struct StateStore<S> {
    state: Mutex<S>,
    publisher: watch::Sender<S>,
}

impl<S: Clone> StateStore<S> {
    pub fn new(initial: S) -> Self {
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            state: Mutex::new(initial),
            publisher,
        }
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);
        self.publisher.send_replace(state.clone());
        result
    }

    /// Reads the current state without publishing anything.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn snapshot(&self) -> S {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.publisher.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let store = StateStore::new(0u32);
        let mut rx = store.subscribe();

        let returned = store.update(|n| {
            *n += 5;
            *n * 2
        });
        assert_eq!(returned, 10);
        assert_eq!(store.snapshot(), 5);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 5);
    }

    #[test]
    fn test_update_without_subscribers() {
        let store = StateStore::new(vec![1, 2]);
        store.update(|v| v.push(3));
        assert_eq!(store.snapshot(), vec![1, 2, 3]);
    }
}
