use crate::model::{GroupStatus, GroupUnitCount, InventoryItem, Lookup, ReconciliationResult, Status};

/// Judge one group against its catalog expectation.
///
/// `local >= expected` counts as complete so that duplicate or bonus units
/// held locally never flag a group as incomplete. Do not tighten this to
/// equality.
pub fn classify_group(local: u32, expected: u32) -> Status {
    if expected == 0 {
        Status::Nonexistent
    } else if local >= expected {
        Status::Complete
    } else if local > 0 {
        Status::Partial
    } else {
        Status::Missing
    }
}

/// Reconcile an item's held units against its catalog lookup.
pub fn reconcile(item: &InventoryItem, local: &GroupUnitCount, lookup: &Lookup) -> ReconciliationResult {
    let local_group_count = local.held_groups();
    let local_unit_total = local.total_units();

    let Some(entry) = lookup.entry() else {
        let groups = (1..=local.max_group())
            .map(|group| GroupStatus {
                group,
                status: Status::Unknown,
                local: local.get(group),
                expected: None,
            })
            .collect();
        return ReconciliationResult {
            key: item.key.clone(),
            title: item.title.clone(),
            groups,
            aggregate: Status::Unknown,
            complete_count: 0,
            local_group_count,
            expected_group_count: None,
            local_unit_total,
        };
    };

    let total = entry.total_group_count;
    let groups: Vec<GroupStatus> = (1..=total)
        .map(|group| {
            let expected = entry.expected(group);
            let held = local.get(group);
            GroupStatus {
                group,
                status: classify_group(held, expected),
                local: held,
                expected: Some(expected),
            }
        })
        .collect();

    let complete_count = groups.iter().filter(|g| g.status == Status::Complete).count() as u32;

    let aggregate = if total == 0 {
        Status::Unknown
    } else if complete_count == total {
        Status::Complete
    } else if complete_count > 0 {
        Status::Partial
    } else {
        Status::Missing
    };

    ReconciliationResult {
        key: item.key.clone(),
        title: item.title.clone(),
        groups,
        aggregate,
        complete_count,
        local_group_count,
        expected_group_count: Some(total),
        local_unit_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogEntry;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn entry(total: u32, seasons: &[(u32, u32)]) -> Lookup {
        Lookup::Found(Arc::new(CatalogEntry {
            catalog_id: 1,
            name: "Show".into(),
            total_group_count: total,
            group_counts: seasons.iter().copied().collect::<BTreeMap<_, _>>(),
        }))
    }

    fn held(pairs: &[(u32, u32)]) -> GroupUnitCount {
        pairs.iter().copied().collect()
    }

    fn statuses(r: &ReconciliationResult) -> Vec<Status> {
        r.groups.iter().map(|g| g.status).collect()
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify_group(0, 0), Status::Nonexistent);
        assert_eq!(classify_group(5, 0), Status::Nonexistent);
        assert_eq!(classify_group(0, 8), Status::Missing);
        assert_eq!(classify_group(1, 8), Status::Partial);
        assert_eq!(classify_group(8, 8), Status::Complete);
        // Bonus units still complete
        assert_eq!(classify_group(9, 8), Status::Complete);
    }

    #[test]
    fn mixed_show() {
        let item = InventoryItem::new("10", "Show");
        let r = reconcile(&item, &held(&[(1, 10), (2, 5)]), &entry(3, &[(1, 10), (2, 8), (3, 0)]));

        assert_eq!(statuses(&r), vec![Status::Complete, Status::Partial, Status::Nonexistent]);
        assert_eq!(r.complete_count, 1);
        assert_eq!(r.aggregate, Status::Partial);
        assert_eq!(r.aggregate_label(), "1/3");
        assert_eq!(r.expected_group_count, Some(3));
        assert_eq!(r.local_group_count, 2);
    }

    #[test]
    fn all_groups_complete() {
        let item = InventoryItem::new("10", "Show");
        let r = reconcile(&item, &held(&[(1, 6), (2, 6)]), &entry(2, &[(1, 6), (2, 6)]));
        assert_eq!(r.aggregate, Status::Complete);
        assert_eq!(r.aggregate_label(), "2/2");
    }

    #[test]
    fn nothing_complete_is_missing() {
        let item = InventoryItem::new("10", "Show");
        let r = reconcile(&item, &held(&[(1, 2)]), &entry(2, &[(1, 6), (2, 6)]));
        assert_eq!(statuses(&r), vec![Status::Partial, Status::Missing]);
        assert_eq!(r.aggregate, Status::Missing);
        assert_eq!(r.aggregate_label(), "0/2");
    }

    #[test]
    fn empty_catalog_is_unknown() {
        let item = InventoryItem::new("10", "Show");
        let r = reconcile(&item, &held(&[(1, 10)]), &entry(0, &[]));
        assert_eq!(r.aggregate, Status::Unknown);
        assert!(r.groups.is_empty());
        assert_eq!(r.aggregate_label(), "0/0");
    }

    #[test]
    fn not_found_reports_bare_counts() {
        let item = InventoryItem::new("10", "Obscure Show");
        let r = reconcile(&item, &held(&[(1, 4), (3, 2)]), &Lookup::NotFound);

        assert_eq!(r.aggregate, Status::Unknown);
        assert_eq!(r.expected_group_count, None);
        assert_eq!(r.aggregate_label(), "2/?");
        assert_eq!(r.groups.len(), 3);
        assert!(r.groups.iter().all(|g| g.status == Status::Unknown && g.expected.is_none()));
        assert_eq!(r.group(2).map(|g| g.local), Some(0));
    }

    #[test]
    fn units_beyond_catalog_still_counted() {
        let item = InventoryItem::new("10", "Show");
        let r = reconcile(&item, &held(&[(0, 3), (1, 10), (4, 7)]), &entry(1, &[(1, 10)]));
        assert_eq!(r.groups.len(), 1);
        assert_eq!(r.aggregate, Status::Complete);
        assert_eq!(r.local_unit_total, 20);
    }
}
