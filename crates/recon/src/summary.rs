use serde::Serialize;

use crate::model::{ReconciliationResult, Status};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub items: usize,
    pub complete: usize,
    pub partial: usize,
    pub missing: usize,
    pub unknown: usize,
    pub local_units: u64,
}

/// Compute aggregate-status counts over a grouped sheet's results.
pub fn compute_summary(results: &[ReconciliationResult]) -> ReconSummary {
    let mut summary = ReconSummary {
        items: results.len(),
        ..ReconSummary::default()
    };

    for r in results {
        summary.local_units += u64::from(r.local_unit_total);
        match r.aggregate {
            Status::Complete => summary.complete += 1,
            Status::Partial => summary.partial += 1,
            Status::Missing => summary.missing += 1,
            Status::Unknown | Status::Nonexistent => summary.unknown += 1,
        }
    }

    summary
}
