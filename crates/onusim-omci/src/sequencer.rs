//! MIB upload sequencing.
//!
//! The OLT walks the catalogue with increasing command numbers. The sequencer
//! holds no cursor of its own: every step stamps whatever the ONU's counters
//! currently hold, so replaying a command number does not reproduce the
//! frame it returned the first time.

use crate::catalogue::{catalogue, EntityDescriptor, InstanceRule, StampTarget};
use crate::error::{OmciError, OmciResult};
use crate::frame::{EntityRecord, OmciFrame};
use crate::message::OnuKey;
use crate::state::{InstanceCounters, OnuOmciState};

/// Walks a descriptor table on behalf of one ONU at a time.
#[derive(Debug, Clone, Copy)]
pub struct UploadSequencer {
    entries: &'static [EntityDescriptor],
}

impl Default for UploadSequencer {
    fn default() -> Self {
        Self::new(catalogue())
    }
}

impl UploadSequencer {
    pub fn new(entries: &'static [EntityDescriptor]) -> Self {
        Self { entries }
    }

    /// Number of valid upload next steps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &'static [EntityDescriptor] {
        self.entries
    }

    /// Produce the frame for `command` and advance the ONU's counters.
    pub fn next(
        &self,
        key: &OnuKey,
        state: &mut OnuOmciState,
        command: u16,
    ) -> OmciResult<OmciFrame> {
        let Some(descriptor) = self.entries.get(usize::from(command)) else {
            state.extra_mib_upload_ctr = state.extra_mib_upload_ctr.wrapping_add(1);
            tracing::warn!(
                onu = %key,
                command,
                uploads = state.mib_upload_ctr,
                extras = state.extra_mib_upload_ctr,
                "Invalid MIB upload request"
            );
            return Err(OmciError::UploadIndexOutOfRange {
                key: *key,
                command,
                uploads: state.mib_upload_ctr,
                extras: state.extra_mib_upload_ctr,
            });
        };

        tracing::trace!(onu = %key, command, entity = descriptor.name, "MIB upload next");

        let mut record = descriptor.record();
        apply_rule(&descriptor.rule, &mut record, &mut state.counters);
        state.mib_upload_ctr = state.mib_upload_ctr.wrapping_add(1);

        Ok(OmciFrame::entity(descriptor.header(), &record))
    }
}

fn apply_rule(rule: &InstanceRule, record: &mut EntityRecord, counters: &mut InstanceCounters) {
    match *rule {
        InstanceRule::Static => {}
        InstanceRule::Stamped {
            counter,
            pre_increment,
        } => {
            let value = counter.get_mut(counters);
            if pre_increment {
                *value = value.wrapping_add(1);
            }
            record.set_instance_low(*value);
        }
        InstanceRule::PostIncrement { counter, target } => {
            let value = counter.get_mut(counters);
            match target {
                StampTarget::Instance => record.set_instance_low(*value),
                StampTarget::Value(offset) => record.set_value(offset, *value),
            }
            *value = value.wrapping_add(1);
        }
        InstanceRule::SharedReference {
            counter,
            reference,
            offsets,
            step_back,
        } => {
            record.set_instance_low(counter.get(counters));
            let related = reference.get_mut(counters);
            if step_back {
                *related = related.wrapping_sub(1);
            }
            for offset in offsets {
                record.set_value(*offset, *related);
            }
        }
    }
}
