use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::db_types::Order;

/// Bounded multi-consumer queue between the fetch loop and the workers.
///
/// A full queue makes [`DispatchQueue::push`] wait, which in turn holds back the next lease. Both ends give up as
/// soon as the cancellation token fires.
#[derive(Clone)]
pub struct DispatchQueue {
    sender: mpsc::Sender<Order>,
    receiver: Arc<Mutex<mpsc::Receiver<Order>>>,
}

impl DispatchQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self { sender, receiver: Arc::new(Mutex::new(receiver)) }
    }

    /// Waits for space in the queue. If cancellation wins the race, the order is handed back to the caller.
    pub async fn push(&self, order: Order, cancel: &CancellationToken) -> Result<(), Order> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(order),
            permit = self.sender.reserve() => match permit {
                Ok(permit) => {
                    permit.send(order);
                    Ok(())
                },
                Err(_) => Err(order),
            },
        }
    }

    /// Takes the next order off the queue. Returns `None` once cancelled, without taking anything.
    pub async fn pop(&self, cancel: &CancellationToken) -> Option<Order> {
        if cancel.is_cancelled() {
            return None;
        }
        let mut receiver = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            receiver = self.receiver.lock() => receiver,
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            order = receiver.recv() => order,
        }
    }

    /// Empties the queue without waiting.
    pub async fn drain(&self) -> Vec<Order> {
        let mut receiver = self.receiver.lock().await;
        let mut orders = Vec::new();
        while let Ok(order) = receiver.try_recv() {
            orders.push(order);
        }
        orders
    }

    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
