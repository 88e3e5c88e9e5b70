//! Sub-project lane packing

use crate::domain::SubProject;

/// Sub-projects sharing one horizontal track, in start order
pub type Lane<'a> = Vec<&'a SubProject>;

/// Greedy first-fit interval packing.
///
/// Sub-projects are taken in ascending start order (input order among
/// equal starts) and placed in the first lane whose last member ends
/// strictly before they start; otherwise a new lane opens. Members of a lane
/// never overlap, and since each lane's last member also has its latest end,
/// the lane count equals the largest set of mutually overlapping ranges.
pub fn pack_lanes(sub_projects: &[SubProject]) -> Vec<Lane<'_>> {
    let mut sorted: Vec<&SubProject> = sub_projects.iter().collect();
    sorted.sort_by_key(|sp| sp.start_date);

    let mut lanes: Vec<Lane<'_>> = Vec::new();
    for sp in sorted {
        let slot = lanes.iter_mut().find(|lane| {
            lane.last()
                .map_or(true, |last| last.end_date < sp.start_date)
        });
        match slot {
            Some(lane) => lane.push(sp),
            None => lanes.push(vec![sp]),
        }
    }
    lanes
}

/// Index of the lane holding `sub_project_id`
pub fn lane_of(lanes: &[Lane<'_>], sub_project_id: &str) -> Option<usize> {
    lanes
        .iter()
        .position(|lane| lane.iter().any(|sp| sp.id == sub_project_id))
}
