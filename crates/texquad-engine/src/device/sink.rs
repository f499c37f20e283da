use std::sync::{Arc, Mutex, PoisonError};

use crate::error::RenderError;

/// Collects device errors that wgpu would otherwise report through its
/// uncaptured-error hook (which panics by default).
///
/// Callers poll with [`check`](Self::check) after each GPU operation, which
/// turns the first pending error into a [`RenderError::GpuOperation`].
#[derive(Debug, Clone, Default)]
pub struct GpuErrorSink {
    pending: Arc<Mutex<Vec<String>>>,
}

impl GpuErrorSink {
    /// Creates a sink and registers it as `device`'s uncaptured-error handler.
    ///
    /// Only one handler can be registered per device; installing a second
    /// sink replaces the first.
    pub fn install(device: &wgpu::Device) -> Self {
        let sink = Self::default();
        let pending = Arc::clone(&sink.pending);

        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            log::error!("gpu error: {err}");
            pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(err.to_string());
        }));

        sink
    }

    /// Returns an error if the device reported anything since the last check.
    ///
    /// All pending messages are drained; they are joined into one message so
    /// nothing is lost when several calls failed in a row.
    pub fn check(&self, op: &'static str) -> Result<(), RenderError> {
        let drained: Vec<String> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        if drained.is_empty() {
            return Ok(());
        }

        Err(RenderError::GpuOperation { op, message: drained.join("; ") })
    }

    /// Returns `true` when at least one error is waiting to be checked.
    pub fn has_pending(&self) -> bool {
        !self.pending.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    #[cfg(test)]
    pub(crate) fn push(&self, message: &str) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sink_checks_ok() {
        let sink = GpuErrorSink::default();
        assert!(sink.check("setup").is_ok());
        assert!(!sink.has_pending());
    }

    #[test]
    fn check_reports_and_drains() {
        let sink = GpuErrorSink::default();
        sink.push("bad texture");
        sink.push("bad bind group");

        let err = sink.check("replace_image").unwrap_err();
        match err {
            RenderError::GpuOperation { op, message } => {
                assert_eq!(op, "replace_image");
                assert_eq!(message, "bad texture; bad bind group");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(sink.check("draw").is_ok());
    }

    #[test]
    fn clones_share_the_queue() {
        let sink = GpuErrorSink::default();
        let other = sink.clone();
        other.push("lost");
        assert!(sink.has_pending());
    }
}
