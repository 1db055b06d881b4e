use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::message::Message;

/// Single-slot rendezvous between one producer and one consumer.
///
/// `put` blocks while the slot is occupied, `get` blocks while it is empty.
pub struct MessageChannel<T = Message> {
    slot: Mutex<Option<T>>,
    changed: Condvar,
}

impl<T> MessageChannel<T> {
    pub fn new() -> Self {
        MessageChannel {
            slot: Mutex::new(None),
            changed: Condvar::new(),
        }
    }

    pub fn put(&self, item: T) {
        let mut slot = self.lock();
        while slot.is_some() {
            slot = self
                .changed
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *slot = Some(item);
        self.changed.notify_all();
    }

    pub fn get(&self) -> T {
        let mut slot = self.lock();
        loop {
            if let Some(item) = slot.take() {
                self.changed.notify_all();
                return item;
            }
            slot = self
                .changed
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Snapshot only; another thread may fill or drain the slot right after.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for MessageChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use crossbeam_channel::unbounded;

    #[test]
    fn get_returns_what_put_stored() {
        let channel: MessageChannel = MessageChannel::new();
        assert!(channel.is_empty());
        channel.put(Message::Acknowledgement);
        assert!(!channel.is_empty());
        assert_eq!(channel.get(), Message::Acknowledgement);
        assert!(channel.is_empty());
    }

    #[test]
    fn put_blocks_until_the_slot_is_drained() {
        let channel = Arc::new(MessageChannel::<u32>::new());
        channel.put(1);

        let (done_tx, done_rx) = unbounded();
        let producer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || {
                channel.put(2);
                done_tx.send(()).expect("signal");
            })
        };

        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(channel.get(), 1);
        done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("second put completes");
        assert_eq!(channel.get(), 2);
        producer.join().expect("producer thread");
    }

    #[test]
    fn get_blocks_until_an_item_arrives() {
        let channel = Arc::new(MessageChannel::<u32>::new());
        let consumer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.get())
        };

        thread::sleep(Duration::from_millis(50));
        channel.put(42);
        assert_eq!(consumer.join().expect("consumer thread"), 42);
    }

    #[test]
    fn items_pass_one_at_a_time_in_order() {
        let channel = Arc::new(MessageChannel::<u32>::new());
        let consumer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || (0..100).map(|_| channel.get()).collect::<Vec<_>>())
        };
        for i in 0..100 {
            channel.put(i);
        }
        assert_eq!(consumer.join().expect("consumer thread"), (0..100).collect::<Vec<_>>());
    }
}
