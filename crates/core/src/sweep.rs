//! I-V / P-V sweep summarisation.
//!
//! The firmware reports a sweep as three index-aligned arrays (`v`, `i`, `p`).
//! [`summarize`] turns them into two plottable curves sorted by voltage and
//! locates the maximum-power point.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One index of a sweep. Missing entries read as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSample {
    pub voltage: f64,
    pub current: f64,
    pub power:   f64,
}

impl SweepSample {
    /// Read index `k` across the three parallel arrays.
    pub fn at(voltages: &[f64], currents: &[f64], powers: &[f64], k: usize) -> Self {
        let read = |values: &[f64]| values.get(k).copied().unwrap_or(f64::NAN);
        Self {
            voltage: read(voltages),
            current: read(currents),
            power:   read(powers),
        }
    }
}

/// A chart point: `x` is always voltage, `y` is current or power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// The sample with the greatest power output in a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxPowerPoint {
    /// Raw index into the power array.
    pub index:   usize,
    pub voltage: f64,
    pub current: f64,
    pub power:   f64,
}

/// Plot-ready view of one sweep poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub iv_curve: Vec<CurvePoint>,
    pub pv_curve: Vec<CurvePoint>,
    pub mpp:      Option<MaxPowerPoint>,
}

impl SweepSummary {
    /// One-line MPP description shown under the chart, empty when there is no MPP.
    pub fn mpp_label(&self) -> String {
        match self.mpp {
            Some(mpp) => format!(
                "MPP ~ {:.2} V, {:.2} A  ->  {:.2} W",
                mpp.voltage, mpp.current, mpp.power
            ),
            None => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iv_curve.is_empty() && self.pv_curve.is_empty() && self.mpp.is_none()
    }
}

/// Build sorted I-V and P-V curves and find the maximum-power point.
///
/// The two curves are filtered independently: an index contributes to the
/// I-V curve when its voltage and current are finite, and to the P-V curve
/// when its voltage and power are finite. Curves only cover indices of the
/// voltage array.
///
/// The MPP is the first index of `powers` holding the largest finite value.
/// Its voltage and current are read at that index and become `0.0` when
/// missing or non-finite, so the marker stays visible through a single
/// glitched reading.
pub fn summarize(voltages: &[f64], currents: &[f64], powers: &[f64]) -> SweepSummary {
    let mut iv_curve = Vec::new();
    let mut pv_curve = Vec::new();

    for k in 0..voltages.len() {
        let sample = SweepSample::at(voltages, currents, powers, k);
        if !sample.voltage.is_finite() {
            continue;
        }
        if sample.current.is_finite() {
            iv_curve.push(CurvePoint { x: sample.voltage, y: sample.current });
        }
        if sample.power.is_finite() {
            pv_curve.push(CurvePoint { x: sample.voltage, y: sample.power });
        }
    }

    // `sort_by` is stable: equal voltages keep arrival order.
    iv_curve.sort_by(by_voltage);
    pv_curve.sort_by(by_voltage);

    SweepSummary {
        iv_curve,
        pv_curve,
        mpp: find_mpp(voltages, currents, powers),
    }
}

fn by_voltage(a: &CurvePoint, b: &CurvePoint) -> Ordering {
    a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal)
}

fn find_mpp(voltages: &[f64], currents: &[f64], powers: &[f64]) -> Option<MaxPowerPoint> {
    let mut best: Option<(usize, f64)> = None;
    for (k, &p) in powers.iter().enumerate() {
        if !p.is_finite() {
            continue;
        }
        match best {
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((k, p)),
        }
    }

    let (index, power) = best?;
    let finite_or_zero = |values: &[f64]| {
        values
            .get(index)
            .copied()
            .filter(|x| x.is_finite())
            .unwrap_or(0.0)
    };

    Some(MaxPowerPoint {
        index,
        voltage: finite_or_zero(voltages),
        current: finite_or_zero(currents),
        power,
    })
}
