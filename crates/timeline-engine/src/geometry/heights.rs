//! Row height estimation from day occupancy

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::domain::{Item, Project, SubProject};
use super::lanes::pack_lanes;
use super::metrics::GridMetrics;

/// Heights of an open project: the main row, one entry per sub-project lane,
/// and the sum including the separator
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectHeight {
    pub main_row_height: f64,
    pub sub_project_row_heights: Vec<f64>,
    pub total_height: f64,
}

fn busiest_day<'a>(items: impl Iterator<Item = &'a Item>) -> usize {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for item in items {
        *per_day.entry(item.date).or_default() += 1;
    }
    per_day.into_values().max().unwrap_or(0).max(1)
}

/// Largest number of items sharing one date, never below 1.
///
/// With `exclude_sub_project_members` set, items inside a sub-project are
/// left out: they stack in their lane, not in the project's main row.
pub fn max_items_per_day(items: &[Item], exclude_sub_project_members: bool) -> usize {
    busiest_day(
        items
            .iter()
            .filter(|i| !exclude_sub_project_members || i.sub_project_id.is_none()),
    )
}

/// Same count restricted to the members of one sub-project
pub fn max_items_per_day_in(items: &[Item], sub_project_id: &str) -> usize {
    busiest_day(
        items
            .iter()
            .filter(|i| i.sub_project_id.as_deref() == Some(sub_project_id)),
    )
}

/// Height of a row whose busiest day holds `max_count` entries.
///
/// Single occupancy keeps the compact base height; deeper days stack
/// entries, growing the row linearly with the stack. Never shorter than the
/// base height, so the result is non-decreasing in `max_count`.
pub fn row_height(max_count: usize, base_height: f64, metrics: &GridMetrics) -> f64 {
    if max_count <= 1 {
        return base_height;
    }
    let n = max_count as f64;
    let stacked = metrics.row_padding + n * metrics.item_height + n * metrics.item_gap;
    stacked.max(base_height)
}

/// Full height of an expanded project: main row, separator, then one row per
/// sub-project lane. Entries of other projects are ignored.
pub fn project_expanded_height(
    project: &Project,
    items: &[Item],
    sub_projects: &[SubProject],
    metrics: &GridMetrics,
) -> ProjectHeight {
    let own_items: Vec<Item> = items
        .iter()
        .filter(|i| i.project_id == project.id)
        .cloned()
        .collect();
    let own_sub_projects: Vec<SubProject> = sub_projects
        .iter()
        .filter(|s| s.project_id == project.id)
        .cloned()
        .collect();

    let main_row_height = row_height(
        max_items_per_day(&own_items, true),
        metrics.base_row_height,
        metrics,
    );

    let sub_project_row_heights: Vec<f64> = pack_lanes(&own_sub_projects)
        .iter()
        .map(|lane| {
            let ids: BTreeSet<&str> = lane.iter().map(|s| s.id.as_str()).collect();
            let lane_max = busiest_day(own_items.iter().filter(|i| {
                i.sub_project_id
                    .as_deref()
                    .map_or(false, |sp| ids.contains(sp))
            }));
            let height = metrics.sub_project_header_height
                + row_height(lane_max, metrics.base_row_height, metrics);
            height.max(metrics.sub_project_min_height)
        })
        .collect();

    let total_height =
        main_row_height + metrics.border + sub_project_row_heights.iter().sum::<f64>();

    ProjectHeight {
        main_row_height,
        sub_project_row_heights,
        total_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn metrics() -> GridMetrics {
        GridMetrics {
            base_row_height: 40.0,
            item_height: 40.0,
            item_gap: 4.0,
            row_padding: 8.0,
            sub_project_header_height: 24.0,
            sub_project_min_height: 70.0,
            border: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_row_height_examples() {
        let m = metrics();
        assert_eq!(row_height(0, 40.0, &m), 40.0);
        assert_eq!(row_height(1, 40.0, &m), 40.0);
        assert_eq!(row_height(2, 40.0, &m), 96.0);
        assert_eq!(row_height(3, 40.0, &m), 140.0);
    }

    #[test]
    fn test_row_height_monotonic() {
        let m = metrics();
        for base in [10.0, 40.0, 120.0] {
            let mut last = row_height(0, base, &m);
            for n in 1..20 {
                let h = row_height(n, base, &m);
                assert!(h >= last, "row_height({}) dropped below row_height({})", n, n - 1);
                last = h;
            }
        }
    }

    #[test]
    fn test_max_items_per_day() {
        let items = vec![
            Item::new("1", "a", "p", day(1)),
            Item::new("2", "b", "p", day(1)),
            Item::new("3", "c", "p", day(2)),
            Item::new("4", "d", "p", day(2)).in_sub_project("sp"),
            Item::new("5", "e", "p", day(2)).in_sub_project("sp"),
            Item::new("6", "f", "p", day(2)).in_sub_project("sp"),
        ];
        assert_eq!(max_items_per_day(&items, false), 4);
        assert_eq!(max_items_per_day(&items, true), 2);
        assert_eq!(max_items_per_day_in(&items, "sp"), 3);
        assert_eq!(max_items_per_day_in(&items, "other"), 1);
        assert_eq!(max_items_per_day(&[], true), 1);
    }

    #[test]
    fn test_project_expanded_height() {
        let m = metrics();
        let project = Project::new("p", "P", "w", 0);
        let sub_projects = vec![
            SubProject::new("a", "A", "p", day(1), day(5)),
            SubProject::new("b", "B", "p", day(3), day(7)),
            SubProject::new("c", "C", "p", day(6), day(9)),
            SubProject::new("x", "Other", "q", day(1), day(9)),
        ];
        let items = vec![
            Item::new("1", "a", "p", day(1)),
            Item::new("2", "b", "p", day(1)),
            Item::new("3", "in a", "p", day(2)).in_sub_project("a"),
            Item::new("4", "in c", "p", day(7)).in_sub_project("c"),
            Item::new("5", "in c", "p", day(7)).in_sub_project("c"),
            Item::new("9", "elsewhere", "q", day(1)),
            Item::new("10", "elsewhere", "q", day(1)),
            Item::new("11", "elsewhere", "q", day(1)),
        ];

        let h = project_expanded_height(&project, &items, &sub_projects, &m);
        assert_eq!(h.main_row_height, 96.0);
        // lane 1 holds a and c (c stacks two on day 7), lane 2 holds b
        assert_eq!(h.sub_project_row_heights, vec![24.0 + 96.0, 70.0]);
        assert_eq!(h.total_height, 96.0 + 1.0 + 120.0 + 70.0);
    }

    #[test]
    fn test_project_without_lanes() {
        let m = metrics();
        let project = Project::new("p", "P", "w", 0);
        let h = project_expanded_height(&project, &[], &[], &m);
        assert_eq!(h.main_row_height, 40.0);
        assert!(h.sub_project_row_heights.is_empty());
        assert_eq!(h.total_height, 41.0);
    }
}
