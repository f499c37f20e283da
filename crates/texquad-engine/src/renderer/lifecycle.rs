use crate::error::RenderError;

/// Observable phase of a [`Lifecycle`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Uninitialized,
    Ready,
    Destroyed,
}

/// Per-surface state machine: Uninitialized → Ready → Destroyed.
///
/// `S` is whatever setup produces. A failed setup leaves the phase unchanged.
/// After `Destroyed`, a new surface may run setup again, starting a new
/// surface lifetime.
#[derive(Debug)]
pub enum Lifecycle<S> {
    Uninitialized,
    Ready(S),
    Destroyed,
}

impl<S> Default for Lifecycle<S> {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl<S> Lifecycle<S> {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Uninitialized => Phase::Uninitialized,
            Self::Ready(_) => Phase::Ready,
            Self::Destroyed => Phase::Destroyed,
        }
    }

    /// Runs `setup` and moves to `Ready`.
    ///
    /// Rejected with [`RenderError::AlreadyInitialized`] when already ready;
    /// `setup` is not called in that case.
    pub fn create(
        &mut self,
        setup: impl FnOnce() -> Result<S, RenderError>,
    ) -> Result<&mut S, RenderError> {
        if let Self::Ready(_) = self {
            return Err(RenderError::AlreadyInitialized);
        }

        *self = Self::Ready(setup()?);
        self.ready_mut()
    }

    pub fn ready(&self) -> Result<&S, RenderError> {
        match self {
            Self::Ready(s) => Ok(s),
            _ => Err(RenderError::NotReady),
        }
    }

    pub fn ready_mut(&mut self) -> Result<&mut S, RenderError> {
        match self {
            Self::Ready(s) => Ok(s),
            _ => Err(RenderError::NotReady),
        }
    }

    /// Moves to `Destroyed`, handing back the ready state if there was one.
    pub fn destroy(&mut self) -> Option<S> {
        match std::mem::replace(self, Self::Destroyed) {
            Self::Ready(s) => Some(s),
            _ => None,
        }
    }
}
