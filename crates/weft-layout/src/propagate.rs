#![forbid(unsafe_code)]

//! Bottom-up minimum-size propagation for one axis.
//!
//! Effective minimums start at the declared minimums and are raised until
//! two conditions hold at the same time:
//!
//! 1. Tracks with positive stretch have minimums in proportion to their
//!    stretch, so they grow together once slack is distributed.
//! 2. Every child's requirement on the axis (less the cell margins between
//!    its tracks) is split over the tracks it spans by weight, or evenly if
//!    they all weigh zero, and each spanned track is raised to at least its
//!    share.
//!
//! Each share depends only on the child and the track weights, so the
//! result does not depend on the order children are visited. Raising tracks
//! to their shares can break the proportion condition, and restoring the
//! proportion only raises tracks further, so both steps repeat until
//! nothing moves. Values only ever increase and the loop settles within
//! three passes for any input; the pass bound exists to turn a solver defect
//! into [`GridError::FailedCalculationCheck`] instead of a hang.

use crate::error::{GridError, Result};
use crate::track::{Axis, TrackParams, cell_margin_total, effective_weights};

/// Changes smaller than this are treated as converged.
const EPSILON: f64 = 1e-6;

/// Minimum extent one child needs across a contiguous run of tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Requirement {
    pub(crate) first: usize,
    pub(crate) last: usize,
    pub(crate) extent: i32,
}

/// Solve effective minimums for one axis, rounded up to whole pixels.
pub(crate) fn propagate_minimums(
    axis: Axis,
    tracks: &[TrackParams],
    cell_margin: i32,
    requirements: &[Requirement],
) -> Result<Vec<i32>> {
    if tracks.is_empty() {
        return Ok(Vec::new());
    }

    let stretches: Vec<f64> = tracks.iter().map(|t| t.stretch).collect();
    let weights = effective_weights(tracks);
    let mut mins: Vec<f64> = tracks.iter().map(|t| t.declared_min as f64).collect();

    let max_passes = requirements.len() + 3;
    let mut settled = false;
    for _ in 0..max_passes {
        let mut changed = normalize_to_stretch(&mut mins, &stretches);
        for requirement in requirements {
            changed |= cover_requirement(&mut mins, &weights, requirement, cell_margin);
        }
        if !changed {
            settled = true;
            break;
        }
    }
    if !settled {
        return Err(GridError::FailedCalculationCheck {
            axis,
            reason: format!("effective minimums still moving after {max_passes} passes"),
        });
    }

    let resolved: Vec<i32> = mins.iter().map(|&m| round_up(m)).collect();
    verify(axis, tracks, cell_margin, requirements, &resolved)?;
    Ok(resolved)
}

/// Raise stretchable tracks so `min / stretch` is the same for all of them.
///
/// Tracks with zero stretch (and every track of an all-zero axis) keep
/// their own minimums.
fn normalize_to_stretch(mins: &mut [f64], stretches: &[f64]) -> bool {
    let ratio = mins
        .iter()
        .zip(stretches)
        .filter(|(_, w)| **w > 0.0)
        .map(|(m, w)| m / w)
        .fold(0.0f64, f64::max);
    if ratio <= 0.0 {
        return false;
    }

    let mut changed = false;
    for (min, &stretch) in mins.iter_mut().zip(stretches) {
        if stretch <= 0.0 {
            continue;
        }
        let target = ratio * stretch;
        if target > *min + EPSILON {
            *min = target;
            changed = true;
        }
    }
    changed
}

/// Raise each track spanned by `requirement` to its share of the requirement.
fn cover_requirement(
    mins: &mut [f64],
    weights: &[f64],
    requirement: &Requirement,
    cell_margin: i32,
) -> bool {
    let span = requirement.first..=requirement.last;
    let count = requirement.last - requirement.first + 1;
    let needed = requirement.extent as f64 - cell_margin_total(count, cell_margin) as f64;
    if needed <= 0.0 {
        return false;
    }

    let span_weight: f64 = weights[span.clone()].iter().sum();
    let mut changed = false;
    for i in span {
        let share = if span_weight > 0.0 {
            needed * weights[i] / span_weight
        } else {
            needed / count as f64
        };
        if share > mins[i] + EPSILON {
            mins[i] = share;
            changed = true;
        }
    }
    changed
}

fn round_up(value: f64) -> i32 {
    let rounded = (value - EPSILON).ceil().max(0.0);
    if rounded >= i32::MAX as f64 {
        i32::MAX
    } else {
        rounded as i32
    }
}

fn verify(
    axis: Axis,
    tracks: &[TrackParams],
    cell_margin: i32,
    requirements: &[Requirement],
    resolved: &[i32],
) -> Result<()> {
    if let Some((index, track)) = tracks
        .iter()
        .enumerate()
        .find(|(i, t)| resolved[*i] < t.declared_min)
    {
        return Err(GridError::FailedCalculationCheck {
            axis,
            reason: format!(
                "track {index} resolved to {} below its declared minimum {}",
                resolved[index], track.declared_min
            ),
        });
    }

    for requirement in requirements {
        let count = requirement.last - requirement.first + 1;
        let covered = resolved[requirement.first..=requirement.last]
            .iter()
            .fold(0i32, |acc, m| acc.saturating_add(*m))
            .saturating_add(cell_margin_total(count, cell_margin));
        if covered < requirement.extent {
            return Err(GridError::FailedCalculationCheck {
                axis,
                reason: format!(
                    "tracks {}..={} cover {covered} of a required {}",
                    requirement.first, requirement.last, requirement.extent
                ),
            });
        }
    }
    Ok(())
}
