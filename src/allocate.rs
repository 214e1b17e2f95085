//! Random assignment of calendar work days to a person's projects.
//!
//! # Algorithm Summary
//!
//! 1. Draw `work_num` distinct days from the month's work days.
//! 2. Give every project a random weight in `(0.5, 1.5]` and draw, with
//!    replacement, the project each sampled day slot belongs to.
//! 3. Give every project one priority day drawn from the sample.
//! 4. Walk the slots in order. A slot whose day is its project's priority day
//!    keeps that day and consumes the priority. Any other slot is filled with
//!    a day drawn from the sample, excluding the project's pending priority
//!    day.
//!
//! Step 4 may record the same day twice for one project. Downstream the
//! timesheet sets hours per day, so a repeated day is counted once.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom;
use rand::seq::index;

use crate::error::{Result, ToolError};
use crate::model::DayAllocation;

const MAX_WEIGHT: f64 = 1.5;

/// Assigns `work_num` day slots drawn from `work_days` to `project_count`
/// projects.
///
/// Fails when there are no projects or fewer work days than slots.
pub fn allocate_days<R: Rng + ?Sized>(
    rng: &mut R,
    work_days: &[u32],
    work_num: usize,
    project_count: usize,
) -> Result<DayAllocation> {
    if project_count == 0 {
        return Err(ToolError::Allocation("no projects to allocate to".into()));
    }
    if work_num > work_days.len() {
        return Err(ToolError::Allocation(format!(
            "{work_num} work days requested but the month only has {}",
            work_days.len()
        )));
    }

    let sample: Vec<u32> = index::sample(rng, work_days.len(), work_num)
        .into_iter()
        .map(|idx| work_days[idx])
        .collect();

    let weights: Vec<f64> = (0..project_count)
        .map(|_| project_weight(rng))
        .collect();
    let picker = WeightedIndex::new(&weights)
        .map_err(|err| ToolError::Allocation(err.to_string()))?;
    let slot_projects: Vec<usize> = (0..work_num).map(|_| picker.sample(rng)).collect();

    let mut priority: Vec<Option<u32>> = (0..project_count)
        .map(|_| sample.choose(rng).copied())
        .collect();

    let mut days = vec![Vec::new(); project_count];
    for (&day, &project) in sample.iter().zip(&slot_projects) {
        let assigned = if priority[project] == Some(day) {
            priority[project] = None;
            day
        } else {
            let pending = priority[project];
            let candidates: Vec<u32> = sample
                .iter()
                .copied()
                .filter(|candidate| Some(*candidate) != pending)
                .collect();
            candidates.choose(rng).copied().unwrap_or(day)
        };
        days[project].push(assigned);
    }

    Ok(DayAllocation { days })
}

/// Draws a project weight from `(0.5, 1.5]`.
fn project_weight<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    MAX_WEIGHT - rng.random::<f64>()
}
