//! ClusterBackupSchedule ↔ Velero Schedule

use kubedash_common::crd::{Schedule, SchedulePhase, ScheduleSpec};

use super::backup::{spec_to_external, spec_to_internal};
use super::{creation_time, labels_of, metadata, object_id};
use crate::apiv2::{
    ClusterBackupSchedule, ClusterBackupScheduleSpec, ClusterBackupScheduleStatus,
    CreateClusterBackupScheduleBody, PatchClusterBackupScheduleBody,
};

/// External representation of a stored schedule
pub fn to_external(schedule: &Schedule) -> ClusterBackupSchedule {
    let status = schedule.status.clone().unwrap_or_default();

    ClusterBackupSchedule {
        name: schedule.metadata.name.clone().unwrap_or_default(),
        id: object_id(&schedule.metadata),
        labels: labels_of(&schedule.metadata),
        creation_timestamp: creation_time(&schedule.metadata),
        spec: ClusterBackupScheduleSpec {
            schedule: schedule.spec.schedule.clone(),
            paused: schedule.spec.paused,
            template: spec_to_external(&schedule.spec.template),
            use_owner_references_in_backup: schedule.spec.use_owner_references_in_backup,
        },
        status: ClusterBackupScheduleStatus {
            phase: status.phase.unwrap_or(SchedulePhase::New).to_string(),
            last_backup: status.last_backup,
            validation_errors: status.validation_errors,
        },
    }
}

/// Schedule to create from a request body
pub fn to_internal(body: CreateClusterBackupScheduleBody) -> Schedule {
    Schedule {
        metadata: metadata(&body.name, body.labels),
        spec: ScheduleSpec {
            schedule: body.spec.schedule,
            template: spec_to_internal(body.spec.template),
            paused: body.spec.paused,
            use_owner_references_in_backup: body.spec.use_owner_references_in_backup,
        },
        status: None,
    }
}

/// Apply the fields present in a patch body
pub fn apply_patch(schedule: &mut Schedule, patch: PatchClusterBackupScheduleBody) {
    if let Some(cron) = patch.schedule {
        schedule.spec.schedule = cron;
    }
    if let Some(paused) = patch.paused {
        schedule.spec.paused = paused;
    }
    if let Some(template) = patch.template {
        schedule.spec.template = spec_to_internal(template);
    }
}
