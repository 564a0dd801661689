//! Capturer registry - create/destroy state machine for registrations.
//!
//! Keyed by stable `CapturerId` in an ordered map. Reconciled against
//! the live capturer list every tick: added capturers get exactly one
//! registration (with a freshly allocated render target), removed
//! capturers have their target released exactly once.

use std::collections::BTreeMap;

use tracing::{debug, error};

use contracts::{CapturerDescriptor, CapturerId, MirrorSettings, RenderSink, TargetHandle};

/// Mirror state of one registered capturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorState {
    #[default]
    Inactive,
    Active,
}

/// One registration: the renderer-owned target plus the per-capturer
/// settings copied from the defaults at registration time.
#[derive(Debug)]
pub struct Registration {
    target: TargetHandle,
    /// Per-capturer UI parameters (editable after registration)
    pub settings: MirrorSettings,
    pub(crate) state: MirrorState,
}

impl Registration {
    /// Render target owned by this registration.
    pub fn target(&self) -> TargetHandle {
        self.target
    }

    /// Whether the mirror was active on the last tick.
    pub fn is_active(&self) -> bool {
        self.state == MirrorState::Active
    }
}

/// What a reconcile pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// IDs newly registered this pass
    pub added: Vec<CapturerId>,

    /// IDs deregistered (resources released) this pass
    pub removed: Vec<CapturerId>,
}

/// Ordered map of registrations, one per capturer.
#[derive(Debug)]
pub struct CapturerRegistry {
    entries: BTreeMap<CapturerId, Registration>,
    defaults: MirrorSettings,
}

impl CapturerRegistry {
    /// Create an empty registry with the given default settings.
    pub fn new(defaults: MirrorSettings) -> Self {
        Self {
            entries: BTreeMap::new(),
            defaults,
        }
    }

    /// Diff the registration set against the live capturer list.
    ///
    /// Added capturers get a new registration with a target sized to
    /// their sensor; removed capturers have their target released.
    /// A target allocation failure is logged and the capturer is left
    /// unregistered - it is retried on the next tick.
    pub fn reconcile(
        &mut self,
        capturers: &[CapturerDescriptor],
        sink: &mut dyn RenderSink,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // Removed: registered ids no longer in the live list
        let removed: Vec<CapturerId> = self
            .entries
            .keys()
            .filter(|id| !capturers.iter().any(|c| &c.id == *id))
            .cloned()
            .collect();

        for id in removed {
            if let Some(registration) = self.entries.remove(&id) {
                sink.release_target(&id, registration.target);
                debug!(capturer = %id, "capturer deregistered, target released");
                report.removed.push(id);
            }
        }

        // Added: live ids without a registration
        for capturer in capturers {
            if self.entries.contains_key(&capturer.id) {
                continue;
            }

            let width = capturer.intrinsics.sensor_width as u32;
            let height = capturer.intrinsics.sensor_height as u32;
            match sink.create_target(&capturer.id, width, height) {
                Ok(target) => {
                    self.entries.insert(
                        capturer.id.clone(),
                        Registration {
                            target,
                            settings: self.defaults,
                            state: MirrorState::Inactive,
                        },
                    );
                    debug!(capturer = %capturer.id, ?target, "capturer registered");
                    report.added.push(capturer.id.clone());
                }
                Err(e) => {
                    // Retry next tick; never insert a half-built entry.
                    error!(capturer = %capturer.id, error = %e, "render target allocation failed");
                }
            }
        }

        report
    }

    /// Number of current registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a registration.
    pub fn get(&self, id: &CapturerId) -> Option<&Registration> {
        self.entries.get(id)
    }

    /// Mutable registration access (per-capturer settings edits).
    pub fn get_mut(&mut self, id: &CapturerId) -> Option<&mut Registration> {
        self.entries.get_mut(id)
    }

    /// Iterate registrations in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&CapturerId, &Registration)> {
        self.entries.iter()
    }

    /// Release every registration's target (teardown path).
    pub fn release_all(&mut self, sink: &mut dyn RenderSink) {
        let entries = std::mem::take(&mut self.entries);
        for (id, registration) in entries {
            sink.release_target(&id, registration.target);
        }
    }
}
