#![forbid(unsafe_code)]

//! Row/column parameters and the top-down stretch distribution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A layout axis. Columns run along the horizontal axis, rows along the vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        })
    }
}

/// Parameters of one row or column ("track").
///
/// `stretch` and `declared_min` are user-set; `effective_min`, `origin` and
/// `extent` are recomputed by every solve pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackParams {
    pub(crate) stretch: f64,
    pub(crate) declared_min: i32,
    pub(crate) effective_min: i32,
    pub(crate) origin: i32,
    pub(crate) extent: i32,
}

impl TrackParams {
    /// Stretch weight (never negative).
    pub fn stretch(&self) -> f64 {
        self.stretch
    }

    /// User-declared minimum extent.
    pub fn declared_min(&self) -> i32 {
        self.declared_min
    }

    /// Minimum after propagating child requirements (>= declared).
    pub fn effective_min(&self) -> i32 {
        self.effective_min
    }

    /// Absolute position of the track's leading edge.
    pub fn origin(&self) -> i32 {
        self.origin
    }

    /// Current extent (width for columns, height for rows).
    pub fn extent(&self) -> i32 {
        self.extent
    }

    pub(crate) fn set_stretch(&mut self, stretch: f64) {
        self.stretch = sanitize_stretch(stretch);
    }

    pub(crate) fn set_declared_min(&mut self, min: i32) {
        self.declared_min = min.max(0);
    }
}

/// Negative, NaN and infinite weights collapse to zero.
pub(crate) fn sanitize_stretch(stretch: f64) -> f64 {
    if stretch.is_finite() && stretch > 0.0 {
        stretch
    } else {
        0.0
    }
}

/// Stretch weights actually used on an axis.
///
/// If every weight on the axis is zero, every track counts as weight 1.
pub(crate) fn effective_weights(tracks: &[TrackParams]) -> Vec<f64> {
    let total: f64 = tracks.iter().map(|t| t.stretch).sum();
    if total > 0.0 {
        tracks.iter().map(|t| t.stretch).collect()
    } else {
        vec![1.0; tracks.len()]
    }
}

/// Total cell margin between `count` adjacent tracks.
#[inline]
pub(crate) fn cell_margin_total(count: usize, cell_margin: i32) -> i32 {
    if count == 0 {
        return 0;
    }
    let gaps = i32::try_from(count - 1).unwrap_or(i32::MAX);
    gaps.saturating_mul(cell_margin)
}

/// Minimum extent of a whole axis: border margins, effective minimums, cell margins.
pub(crate) fn minimum_extent(
    mins: impl IntoIterator<Item = i32>,
    border_margin: i32,
    cell_margin: i32,
) -> i32 {
    let (count, sum) = mins
        .into_iter()
        .fold((0usize, 0i32), |(n, s), m| (n + 1, s.saturating_add(m)));
    border_margin
        .saturating_mul(2)
        .saturating_add(sum)
        .saturating_add(cell_margin_total(count, cell_margin))
}

/// Split `amount` into integer shares proportional to `weights`.
///
/// Largest-remainder rounding: every share is the floor or ceiling of its
/// exact target, the shares sum to `amount` exactly, and ties go to the
/// lower index so the result is deterministic.
pub(crate) fn apportion(amount: i32, weights: &[f64]) -> Vec<i32> {
    let n = weights.len();
    if n == 0 || amount <= 0 {
        return vec![0; n];
    }
    let total: f64 = weights.iter().sum();
    let targets: Vec<f64> = if total > 0.0 {
        weights.iter().map(|w| amount as f64 * w / total).collect()
    } else {
        vec![amount as f64 / n as f64; n]
    };

    let mut shares: Vec<i32> = targets
        .iter()
        .map(|t| t.floor().max(0.0) as i32)
        .collect();
    let floor_sum: i32 = shares.iter().sum();
    let deficit = amount.saturating_sub(floor_sum).max(0) as usize;
    if deficit == 0 {
        return shares;
    }

    // Remainder descending, then index ascending.
    let mut priority: Vec<(usize, f64)> = targets
        .iter()
        .enumerate()
        .map(|(i, &t)| (i, t - shares[i] as f64))
        .collect();
    priority.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    for k in 0..deficit {
        let (i, _) = priority[k % n];
        shares[i] += 1;
    }
    shares
}

/// Assign `origin`/`extent` to every track of one axis.
///
/// `start` and `size` describe the container along the axis. When the
/// usable interior is smaller than the sum of effective minimums every
/// track is pinned to its minimum and the tracks overflow the container.
pub(crate) fn distribute(
    tracks: &mut [TrackParams],
    start: i32,
    size: i32,
    border_margin: i32,
    cell_margin: i32,
) {
    let usable = size
        .saturating_sub(border_margin.saturating_mul(2))
        .saturating_sub(cell_margin_total(tracks.len(), cell_margin));
    let min_sum: i32 = tracks
        .iter()
        .fold(0i32, |acc, t| acc.saturating_add(t.effective_min));

    let shares = if usable > min_sum {
        apportion(usable - min_sum, &effective_weights(tracks))
    } else {
        vec![0; tracks.len()]
    };

    let mut cursor = start.saturating_add(border_margin);
    for (track, share) in tracks.iter_mut().zip(shares) {
        track.origin = cursor;
        track.extent = track.effective_min.saturating_add(share);
        cursor = cursor
            .saturating_add(track.extent)
            .saturating_add(cell_margin);
    }
}
