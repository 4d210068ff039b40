//! Receiving endpoints the [Channel] fans values out to.
//!
//! [Channel]: crate::Channel

use std::fmt;

/// Why a [Sink] refused a value. The value is handed back.
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum TrySendError<T> {
    /// Bounded queue has no spare capacity right now.
    Full(T),
    /// Consumer side is gone.
    Closed(T),
}

impl<T> TrySendError<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(value) | TrySendError::Closed(value) => value,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self, TrySendError::Full(_))
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("Full(..)"),
            TrySendError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Bounded-capacity receiving endpoint, owned by a subscriber's producer side.
///
/// Registering a sink moves it into the [Channel]. From then on the channel is
/// the only one allowed to close it: on explicit deregistration, on eviction
/// during publish, when the channel itself closes, or when the last channel
/// handle is dropped.
///
/// # Identity
///
/// Two sinks are "the same" when [same_sink()] says so - for channel senders
/// this means both feed the same receiver. A channel refuses to register the
/// same sink twice.
///
/// # Closing
///
/// [close()] consumes the sink. The default just drops it, which is what
/// closes the receiving half of the usual channel senders. Note that a receiver
/// only observes the close once *every* sender clone is gone - keep no other
/// clones around if you rely on it.
///
/// [Channel]: crate::Channel
/// [same_sink()]: Sink::same_sink
/// [close()]: Sink::close
pub trait Sink<T> {
    /// Place `value` without blocking, or hand it back.
    fn try_send(&self, value: T) -> Result<(), TrySendError<T>>;

    /// `true` if both feed the same consumer. Registration identity.
    fn same_sink(&self, other: &Self) -> bool;

    #[inline]
    fn close(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

#[cfg(feature = "tokio")]
impl<T> Sink<T> for tokio::sync::mpsc::Sender<T> {
    #[inline]
    fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        use tokio::sync::mpsc::error::TrySendError as Tokio;
        tokio::sync::mpsc::Sender::try_send(self, value).map_err(|err| match err {
            Tokio::Full(value) => TrySendError::Full(value),
            Tokio::Closed(value) => TrySendError::Closed(value),
        })
    }

    #[inline]
    fn same_sink(&self, other: &Self) -> bool {
        self.same_channel(other)
    }
}

#[cfg(all(test, feature = "tokio"))]
mod test_sink {
    use tokio::sync::mpsc;
    use crate::sink::{Sink, TrySendError};

    #[test]
    fn tokio_sender_full_then_closed() {
        let (tx, mut rx) = mpsc::channel::<usize>(1);

        assert_eq!(Sink::try_send(&tx, 1), Ok(()));
        assert_eq!(Sink::try_send(&tx, 2), Err(TrySendError::Full(2)));

        assert_eq!(rx.try_recv(), Ok(1));
        drop(rx);
        let err = Sink::try_send(&tx, 3).unwrap_err();
        assert!(!err.is_full());
        assert_eq!(err.into_inner(), 3);
    }

    #[test]
    fn tokio_sender_identity() {
        let (tx0, _rx0) = mpsc::channel::<usize>(1);
        let (tx1, _rx1) = mpsc::channel::<usize>(1);

        assert!(tx0.same_sink(&tx0.clone()));
        assert!(!tx0.same_sink(&tx1));
    }

    #[test]
    fn default_close_drops_sender() {
        let (tx, mut rx) = mpsc::channel::<usize>(4);
        Sink::try_send(&tx, 7).unwrap();
        Sink::close(tx);

        // Buffered values survive the close.
        assert_eq!(rx.try_recv(), Ok(7));
        assert_eq!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected));
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::sink::{Sink, TrySendError};

    /// Ids of closed [RecordingSink]s, in closing order.
    #[derive(Default, Clone)]
    pub struct ClosedLog(Arc<spin::Mutex<Vec<usize>>>);

    impl ClosedLog {
        pub fn sink(&self, id: usize, capacity: usize) -> RecordingSink {
            RecordingSink {
                id,
                capacity,
                queued: AtomicUsize::new(0),
                log: self.clone(),
            }
        }

        pub fn closed(&self) -> Vec<usize> {
            self.0.lock().clone()
        }
    }

    /// Never drained. Accepts `capacity` values, then reports full.
    pub struct RecordingSink {
        id: usize,
        capacity: usize,
        queued: AtomicUsize,
        log: ClosedLog,
    }

    impl Sink<usize> for RecordingSink {
        fn try_send(&self, value: usize) -> Result<(), TrySendError<usize>> {
            if self.queued.load(Ordering::Acquire) == self.capacity {
                return Err(TrySendError::Full(value));
            }
            self.queued.fetch_add(1, Ordering::AcqRel);
            Ok(())
        }

        fn same_sink(&self, other: &Self) -> bool {
            self.id == other.id
        }

        fn close(self) {
            self.log.0.lock().push(self.id);
        }
    }
}
