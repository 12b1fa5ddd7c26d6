use alloc::collections::VecDeque;

/// A bounded first-in first-out queue.
///
/// Pushing into a full queue fails and hands the element back, so the caller decides whether to
/// drop it.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    inner: VecDeque<T>,
    capacity: usize,
}

impl<T> Queue<T> {
    /// Create an empty queue holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Queue {
            inner: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an element at the back.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.inner.push_back(value);
        Ok(())
    }

    /// Take the element at the front.
    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    /// Look at the element at the front.
    pub fn peek(&self) -> Option<&T> {
        self.inner.front()
    }

    /// Number of queued elements.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// If nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// If another push would fail.
    pub fn is_full(&self) -> bool {
        self.inner.len() >= self.capacity
    }

    /// Iterate over queued elements, front first.
    pub fn iter(&self) -> impl Iterator<Item=&T> + '_ {
        self.inner.iter()
    }
}
