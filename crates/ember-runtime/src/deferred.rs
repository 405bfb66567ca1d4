//! Work handed to the main thread from anywhere

use parking_lot::Mutex;
use std::sync::Arc;

/// A callback run on the main thread with exclusive access to `T`
pub type Deferred<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Queue of callbacks drained once per frame by the main thread
///
/// Draining swaps the pending list out under the lock and runs it after the
/// lock is released, so a callback may enqueue more work. That work runs on
/// the next drain.
pub struct MainThreadQueue<T> {
    pending: Arc<Mutex<Vec<Deferred<T>>>>,
}

/// Cloneable handle for enqueueing work from other threads
pub struct MainThreadSender<T> {
    pending: Arc<Mutex<Vec<Deferred<T>>>>,
}

impl<T> Clone for MainThreadSender<T> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> Default for MainThreadQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MainThreadQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sender(&self) -> MainThreadSender<T> {
        MainThreadSender {
            pending: Arc::clone(&self.pending),
        }
    }

    /// Push a callback onto the queue
    pub fn submit(&self, callback: impl FnOnce(&mut T) + Send + 'static) {
        self.pending.lock().push(Box::new(callback));
    }

    /// Run everything queued so far, in submission order. Returns the
    /// number of callbacks run.
    pub fn drain(&self, target: &mut T) -> usize {
        let batch = std::mem::take(&mut *self.pending.lock());
        let count = batch.len();
        for callback in batch {
            callback(target);
        }
        count
    }

    /// Number of pending callbacks
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl<T> MainThreadSender<T> {
    /// Push a callback onto the queue
    pub fn submit(&self, callback: impl FnOnce(&mut T) + Send + 'static) {
        self.pending.lock().push(Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_runs_in_order() {
        let queue = MainThreadQueue::<Vec<u32>>::new();
        queue.submit(|v| v.push(1));
        queue.submit(|v| v.push(2));
        assert_eq!(queue.len(), 2);

        let mut target = Vec::new();
        assert_eq!(queue.drain(&mut target), 2);
        assert_eq!(target, vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn work_from_other_threads() {
        let queue = MainThreadQueue::<Vec<u32>>::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sender = queue.sender();
                thread::spawn(move || sender.submit(move |v| v.push(i)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut target = Vec::new();
        queue.drain(&mut target);
        target.sort();
        assert_eq!(target, vec![0, 1, 2, 3]);
    }

    #[test]
    fn reentrant_submit_runs_next_drain() {
        struct Target {
            sender: MainThreadSender<Target>,
            hits: u32,
        }

        let queue = MainThreadQueue::<Target>::new();
        let mut target = Target {
            sender: queue.sender(),
            hits: 0,
        };

        queue.submit(|t: &mut Target| {
            t.hits += 1;
            t.sender.submit(|t: &mut Target| t.hits += 10);
        });

        assert_eq!(queue.drain(&mut target), 1);
        assert_eq!(target.hits, 1);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.drain(&mut target), 1);
        assert_eq!(target.hits, 11);
    }
}
