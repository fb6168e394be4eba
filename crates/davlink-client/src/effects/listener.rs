//! Request lifecycle notification.

use std::sync::Arc;

/// Observer notified at the start and end of every network request.
///
/// Used for connection accounting, not transfer logic. Listeners see a
/// start/finish pair for every exchange exactly once, however it ends.
pub trait ConnectionListener: Send + Sync {
    fn on_start_request(&self);
    fn on_finish_request(&self);
}

/// Ordered set of [`ConnectionListener`]s, registered for the lifetime of
/// the owning engine and notified in registration order.
#[derive(Default)]
pub struct RequestNotifier {
    listeners: Vec<Arc<dyn ConnectionListener>>,
}

impl RequestNotifier {
    pub fn new(listeners: Vec<Arc<dyn ConnectionListener>>) -> Self {
        Self { listeners }
    }

    /// Scope one request: start fires now, finish fires when the guard
    /// drops, so the pair holds on every exit path.
    pub(crate) fn guard(&self) -> RequestGuard<'_> {
        RequestGuard::new(self)
    }

    fn notify_start(&self) {
        for listener in &self.listeners {
            listener.on_start_request();
        }
    }

    fn notify_finish(&self) {
        for listener in &self.listeners {
            listener.on_finish_request();
        }
    }
}

pub(crate) struct RequestGuard<'a> {
    notifier: &'a RequestNotifier,
}

impl<'a> RequestGuard<'a> {
    fn new(notifier: &'a RequestNotifier) -> Self {
        notifier.notify_start();
        Self { notifier }
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.notifier.notify_finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl ConnectionListener for Counting {
        fn on_start_request(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_finish_request(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn guard_fires_exactly_one_pair() {
        let listener = Arc::new(Counting::default());
        let notifier = RequestNotifier::new(vec![listener.clone()]);

        {
            let _guard = notifier.guard();
            assert_eq!(listener.started.load(Ordering::SeqCst), 1);
            assert_eq!(listener.finished.load(Ordering::SeqCst), 0);
        }

        assert_eq!(listener.started.load(Ordering::SeqCst), 1);
        assert_eq!(listener.finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_fires_finish_on_early_exit() {
        let listener = Arc::new(Counting::default());
        let notifier = RequestNotifier::new(vec![listener.clone()]);

        let result: Result<(), ()> = (|| {
            let _guard = notifier.guard();
            Err(())
        })();

        assert!(result.is_err());
        assert_eq!(listener.started.load(Ordering::SeqCst), 1);
        assert_eq!(listener.finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_notified_in_registration_order() {
        use std::sync::Mutex;

        struct Tagging {
            tag: &'static str,
            log: Arc<Mutex<Vec<&'static str>>>,
        }

        impl ConnectionListener for Tagging {
            fn on_start_request(&self) {
                self.log.lock().unwrap().push(self.tag);
            }

            fn on_finish_request(&self) {}
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let notifier = RequestNotifier::new(vec![
            Arc::new(Tagging {
                tag: "a",
                log: log.clone(),
            }),
            Arc::new(Tagging {
                tag: "b",
                log: log.clone(),
            }),
        ]);

        let _guard = notifier.guard();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }
}
