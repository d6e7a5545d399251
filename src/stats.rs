//! Point-in-time aggregate counts across all collections.
//! Each count is an independent read against one collection; there is no
//! snapshot across the eight counts, so concurrent writers may be observed
//! between reads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DefectStatus, ProposalStatus, RemediationStatus};
use crate::store::Store;

/// Trailing window, in days, for "recent" releases.
pub const RECENT_RELEASE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_defects: usize,
    pub open_defects: usize,
    pub resolved_defects: usize,
    pub pending_remediations: usize,
    pub deployed_remediations: usize,
    pub recent_releases: usize,
    pub new_proposals: usize,
    pub total_users: usize,
}

/// Compute dashboard counts as of the given instant.
pub fn compute(store: &Store, as_of: DateTime<Utc>) -> Stats {
    let cutoff = as_of - Duration::days(RECENT_RELEASE_DAYS);
    Stats {
        total_defects: store.defects.len(),
        open_defects: store.defects.count(|d| d.status == DefectStatus::Open),
        resolved_defects: store.defects.count(|d| d.status == DefectStatus::Resolved),
        pending_remediations: store.remediations.count(|r| r.status == RemediationStatus::Pending),
        deployed_remediations: store.remediations.count(|r| r.status == RemediationStatus::Deployed),
        recent_releases: store.releases.count(|r| r.created_at > cutoff && r.created_at <= as_of),
        new_proposals: store.proposals.count(|p| p.status == ProposalStatus::New),
        total_users: store.users.len(),
    }
}
