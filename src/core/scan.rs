use std::time::{Duration, Instant};

use tracing::debug;

use crate::core::signal::{SignalSimulator, Trace};

/// Per-element peak intensities, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ScanMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "ScanMatrix rows must have equal length"
        );
        Self {
            rows: rows.len(),
            cols,
            values: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, v: f64) {
        self.values[row * self.cols + col] = v;
    }

    /// (min, max) over all cells; `None` for an empty matrix.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        let lo = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }
}

/// One acquired element: its grid position, raw trace and summary.
#[derive(Clone, Debug)]
pub struct ElementFrame {
    pub row: usize,
    pub col: usize,
    pub trace: Trace,
    pub peak: f64,
}

impl ElementFrame {
    pub fn title(&self) -> String {
        format!("element position: ({}, {})", self.row + 1, self.col + 1)
    }
}

#[derive(Clone, Debug)]
pub enum AcquisitionEvent {
    Element(ElementFrame),
    Complete(ScanMatrix),
}

/// Cooperative scan over the element grid.
///
/// Each `step` whose deadline has passed acquires one element and schedules the
/// next one `delay` later. After the last element (and its pause) one
/// `Complete` event carries the finished matrix; later steps yield nothing.
#[derive(Clone, Debug)]
pub struct Acquisition {
    matrix: ScanMatrix,
    cursor: usize,
    delay: Duration,
    next_due: Instant,
    finished: bool,
}

impl Acquisition {
    pub fn new(rows: usize, cols: usize, delay: Duration, start: Instant) -> Self {
        Self {
            matrix: ScanMatrix::zeros(rows, cols),
            cursor: 0,
            delay,
            next_due: start,
            finished: false,
        }
    }

    pub fn total(&self) -> usize {
        self.matrix.len()
    }

    pub fn acquired(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress(&self) -> f32 {
        if self.total() == 0 {
            1.0
        } else {
            self.cursor as f32 / self.total() as f32
        }
    }

    /// Time left until the next step is due (zero when overdue).
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    pub fn step(&mut self, sim: &mut SignalSimulator, now: Instant) -> Option<AcquisitionEvent> {
        if self.finished || now < self.next_due {
            return None;
        }
        if self.cursor < self.total() {
            let row = self.cursor / self.matrix.cols;
            let col = self.cursor % self.matrix.cols;
            let trace = sim.generate();
            let peak = trace.peak_abs();
            self.matrix.set(row, col, peak);
            self.cursor += 1;
            self.next_due = now + self.delay;
            debug!("element ({row}, {col}) peak={peak:.3}");
            return Some(AcquisitionEvent::Element(ElementFrame {
                row,
                col,
                trace,
                peak,
            }));
        }
        self.finished = true;
        Some(AcquisitionEvent::Complete(self.matrix.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signal::SignalParams;

    #[test]
    fn visits_grid_row_major_then_completes() {
        let mut sim = SignalSimulator::with_seed(SignalParams::default(), 3);
        let t0 = Instant::now();
        let mut acq = Acquisition::new(3, 4, Duration::ZERO, t0);

        let mut seen = Vec::new();
        let mut peaks = Vec::new();
        let matrix = loop {
            match acq.step(&mut sim, t0).expect("zero delay is always due") {
                AcquisitionEvent::Element(f) => {
                    assert_eq!(f.trace.len(), 200);
                    assert_eq!(f.peak, f.trace.peak_abs());
                    seen.push((f.row, f.col));
                    peaks.push(f.peak);
                }
                AcquisitionEvent::Complete(m) => break m,
            }
        };

        let expected: Vec<(usize, usize)> =
            (0..3).flat_map(|r| (0..4).map(move |c| (r, c))).collect();
        assert_eq!(seen, expected);
        assert_eq!(matrix.values(), peaks.as_slice());
        assert!(acq.is_finished());
        assert!(acq.step(&mut sim, t0).is_none());
    }

    #[test]
    fn waits_for_delay_between_elements() {
        let mut sim = SignalSimulator::with_seed(SignalParams::default(), 5);
        let t0 = Instant::now();
        let delay = Duration::from_millis(100);
        let mut acq = Acquisition::new(1, 2, delay, t0);

        assert!(matches!(
            acq.step(&mut sim, t0),
            Some(AcquisitionEvent::Element(_))
        ));
        assert!(acq.step(&mut sim, t0 + Duration::from_millis(50)).is_none());
        assert_eq!(
            acq.time_until_due(t0 + Duration::from_millis(50)),
            Duration::from_millis(50)
        );

        let t1 = t0 + delay;
        assert!(matches!(
            acq.step(&mut sim, t1),
            Some(AcquisitionEvent::Element(_))
        ));
        assert_eq!(acq.acquired(), 2);
        assert!(acq.step(&mut sim, t1).is_none(), "pause after last element");
        assert!(matches!(
            acq.step(&mut sim, t1 + delay),
            Some(AcquisitionEvent::Complete(_))
        ));
    }

    #[test]
    fn element_titles_are_one_based() {
        let f = ElementFrame {
            row: 2,
            col: 3,
            trace: Trace::default(),
            peak: 0.0,
        };
        assert_eq!(f.title(), "element position: (3, 4)");
    }

    #[test]
    fn matrix_accessors() {
        let m = ScanMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, -4.0]]);
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.min_max(), Some((-4.0, 3.0)));
        assert_eq!(ScanMatrix::zeros(0, 4).min_max(), None);
    }
}
