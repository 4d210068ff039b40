use std::fmt;

/// Misuse of [Channel::try_register].
///
/// [Channel::try_register]: crate::Channel::try_register
#[derive(thiserror::Error)]
pub enum RegisterError<S> {
    /// This sink (by [Sink::same_sink]) is already registered on the channel.
    /// The rejected sink is handed back untouched.
    ///
    /// [Sink::same_sink]: crate::Sink::same_sink
    #[error("sink passed multiple times to register()")]
    AlreadyRegistered(S),
}

impl<S> RegisterError<S> {
    /// The rejected sink.
    #[inline]
    pub fn into_sink(self) -> S {
        match self {
            RegisterError::AlreadyRegistered(sink) => sink,
        }
    }
}

// Sinks are rarely Debug.
impl<S> fmt::Debug for RegisterError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::AlreadyRegistered(_) => f.write_str("AlreadyRegistered(..)"),
        }
    }
}
