//! Headless render sink.
//!
//! Stands in for a real renderer when the pipeline runs without a
//! display: target handles are minted from a counter and every
//! submission is tallied instead of drawn.

use std::collections::BTreeMap;

use tracing::trace;

use contracts::{CapturerId, CompositeParams, ContractError, MirrorQuad, RenderSink, TargetHandle};

/// Sink that accepts everything and records what happened.
#[derive(Debug, Default)]
pub struct NullRenderSink {
    next_handle: u64,
    targets: BTreeMap<CapturerId, TargetHandle>,
    submissions: u64,
    deactivations: u64,
}

impl NullRenderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets currently alive.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    pub fn deactivations(&self) -> u64 {
        self.deactivations
    }
}

impl RenderSink for NullRenderSink {
    fn create_target(
        &mut self,
        id: &CapturerId,
        width: u32,
        height: u32,
    ) -> Result<TargetHandle, ContractError> {
        let handle = TargetHandle(self.next_handle);
        self.next_handle += 1;
        self.targets.insert(id.clone(), handle);
        trace!(%id, width, height, ?handle, "target created");
        Ok(handle)
    }

    fn release_target(&mut self, id: &CapturerId, handle: TargetHandle) {
        self.targets.remove(id);
        trace!(%id, ?handle, "target released");
    }

    fn submit(
        &mut self,
        id: &CapturerId,
        _quad: &MirrorQuad,
        _params: &CompositeParams,
    ) -> Result<(), ContractError> {
        self.submissions += 1;
        trace!(%id, "mirror submitted");
        Ok(())
    }

    fn deactivate(&mut self, id: &CapturerId) {
        self.deactivations += 1;
        trace!(%id, "mirror deactivated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut sink = NullRenderSink::new();
        let a = sink.create_target(&CapturerId::new("a"), 64, 64).unwrap();
        let b = sink.create_target(&CapturerId::new("b"), 64, 64).unwrap();

        assert_ne!(a, b);
        assert_eq!(sink.target_count(), 2);
    }

    #[test]
    fn test_release_drops_target() {
        let mut sink = NullRenderSink::new();
        let id = CapturerId::new("cam");
        let handle = sink.create_target(&id, 32, 32).unwrap();
        sink.release_target(&id, handle);

        assert_eq!(sink.target_count(), 0);
    }
}
