//! Sector ledger
//!
//! Ordered checkpoints plus per-lap cleared flags and the last/best/delta
//! time rows of every sector.

use contracts::{Checkpoint, CrossingOutcome, SectorCrossing, TimeSlot, MIN_SECTOR_COUNT};

use crate::codec::round_ms;
use crate::error::{LedgerError, Result};

/// In-memory timing state of the current session
#[derive(Debug, Clone, PartialEq)]
pub struct SectorLedger {
    checkpoints: Vec<Checkpoint>,
    cleared: Vec<bool>,
    /// One row per [`TimeSlot`], one column per sector
    times: [Vec<Option<f64>>; 3],
}

impl SectorLedger {
    /// Unconfigured ledger with `count` sectors (at least two)
    pub fn new(count: usize) -> Self {
        let count = count.max(MIN_SECTOR_COUNT);
        Self {
            checkpoints: vec![Checkpoint::Unset; count],
            cleared: vec![false; count],
            times: std::array::from_fn(|_| vec![None; count]),
        }
    }

    /// Ledger over a possibly partial layout
    ///
    /// Unset entries are allowed; set entries must respect ordering.
    pub fn from_checkpoints(checkpoints: Vec<Checkpoint>) -> Result<Self> {
        validate_layout(&checkpoints, false)?;
        let mut ledger = Self::new(checkpoints.len());
        ledger.checkpoints = checkpoints;
        Ok(ledger)
    }

    /// Replace the checkpoint sequence with a complete layout
    ///
    /// Fails without side effects if any checkpoint is unset or out of order.
    /// Times survive when the sector count is unchanged.
    pub fn configure(&mut self, checkpoints: Vec<Checkpoint>) -> Result<()> {
        validate_layout(&checkpoints, true)?;
        if checkpoints.len() != self.sector_count() {
            *self = Self::new(checkpoints.len());
        }
        self.checkpoints = checkpoints;
        self.reset_cleared();
        Ok(())
    }

    /// Set one checkpoint directly, keeping the layout ordered
    pub fn set_checkpoint(&mut self, index: usize, checkpoint: Checkpoint) -> Result<()> {
        self.check_index(index)?;
        let mut candidate = self.checkpoints.clone();
        candidate[index] = checkpoint;
        validate_layout(&candidate, false)?;
        self.checkpoints = candidate;
        Ok(())
    }

    /// Place checkpoint `index` at the car's current progress
    ///
    /// Sectors are placed in order: the slot must be unset, its predecessor
    /// set, and the car past the predecessor.
    pub fn place_checkpoint(&mut self, index: usize, progress: f64) -> Result<Checkpoint> {
        self.check_index(index)?;
        if self.checkpoints[index].is_set() {
            return Err(LedgerError::CheckpointAlreadySet { index });
        }
        if index > 0 {
            let previous = self.checkpoints[index - 1];
            if !previous.is_set() {
                return Err(LedgerError::PreviousCheckpointUnset { index });
            }
            if progress <= previous.as_raw() {
                return Err(LedgerError::OutOfOrder {
                    index,
                    position: progress,
                    previous: previous.as_raw(),
                });
            }
        }

        let checkpoint = Checkpoint::At(progress);
        self.set_checkpoint(index, checkpoint)?;
        Ok(checkpoint)
    }

    /// Make the last sector end on the finish line
    pub fn set_finish_line_as_last(&mut self) -> Result<()> {
        let index = self.sector_count() - 1;
        if self.checkpoints[index].is_set() {
            return Err(LedgerError::CheckpointAlreadySet { index });
        }
        self.checkpoints[index] = Checkpoint::FinishLine;
        Ok(())
    }

    /// Change the sector count, discarding checkpoints and times
    pub fn resize(&mut self, count: usize, max: usize) -> Result<()> {
        if !(MIN_SECTOR_COUNT..=max).contains(&count) {
            return Err(LedgerError::SectorCountOutOfRange {
                requested: count,
                min: MIN_SECTOR_COUNT,
                max,
            });
        }
        *self = Self::new(count);
        Ok(())
    }

    /// Load stored best times; entries past the sector count are ignored
    pub fn load_best_times(&mut self, best: &[Option<f64>]) {
        for (slot, value) in self.times[TimeSlot::Best.index()].iter_mut().zip(best) {
            *slot = value.map(round_ms);
        }
    }

    /// Record a crossing of sector `index` at cumulative lap time `lap_elapsed`
    ///
    /// The split subtracts the last times of earlier sectors that are cleared
    /// on this lap; an earlier sector that was skipped leaves its duration
    /// inside this split.
    pub fn record_crossing(&mut self, index: usize, lap_elapsed: f64) -> Result<SectorCrossing> {
        self.check_index(index)?;
        Ok(self.close_sector(index, lap_elapsed))
    }

    /// Whether sector `index` should close at `progress`
    ///
    /// Unset checkpoints never fire. The finish-line sentinel lies above any
    /// on-track position, so only a synthetic progress past it closes that sector.
    pub fn crossing_due(&self, index: usize, progress: f64) -> bool {
        match self.checkpoints.get(index) {
            Some(checkpoint) if checkpoint.is_set() => {
                !self.cleared[index] && progress >= checkpoint.as_raw()
            }
            _ => false,
        }
    }

    /// Close every due sector in ascending order
    ///
    /// Stops at the first uncleared sector that is not due, so a later sector
    /// is never cleared ahead of an earlier one.
    pub fn advance(&mut self, progress: f64, lap_elapsed: f64) -> Vec<SectorCrossing> {
        let mut crossings = Vec::new();
        for index in 0..self.sector_count() {
            if self.cleared[index] {
                continue;
            }
            if !self.crossing_due(index, progress) {
                break;
            }
            crossings.push(self.close_sector(index, lap_elapsed));
        }
        crossings
    }

    pub fn reset_cleared(&mut self) {
        self.cleared.iter_mut().for_each(|c| *c = false);
    }

    /// Unset all checkpoints; times are kept
    pub fn reset_checkpoints(&mut self) {
        self.checkpoints.iter_mut().for_each(|c| *c = Checkpoint::Unset);
    }

    /// Clear last, best and delta of every sector
    pub fn reset_times(&mut self) {
        for row in self.times.iter_mut() {
            row.iter_mut().for_each(|t| *t = None);
        }
    }

    pub fn is_configured(&self) -> bool {
        self.checkpoints.iter().all(|c| c.is_set())
    }

    pub fn all_cleared(&self) -> bool {
        self.cleared.iter().all(|c| *c)
    }

    pub fn is_cleared(&self, index: usize) -> bool {
        self.cleared.get(index).copied().unwrap_or(false)
    }

    /// First sector not yet cleared on this lap
    pub fn current_sector(&self) -> Option<usize> {
        self.cleared.iter().position(|c| !c)
    }

    pub fn sector_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn checkpoint(&self, index: usize) -> Option<Checkpoint> {
        self.checkpoints.get(index).copied()
    }

    pub fn time(&self, slot: TimeSlot, index: usize) -> Option<f64> {
        self.times[slot.index()].get(index).copied().flatten()
    }

    pub fn times(&self, slot: TimeSlot) -> &[Option<f64>] {
        &self.times[slot.index()]
    }

    pub fn has_best_times(&self) -> bool {
        self.times(TimeSlot::Best).iter().any(Option::is_some)
    }

    /// Sum of all bests, once every sector has one
    pub fn theoretical_best(&self) -> Option<f64> {
        sum_all(self.times(TimeSlot::Best))
    }

    /// Sum of this lap's splits, once every sector is cleared
    pub fn lap_total(&self) -> Option<f64> {
        if !self.all_cleared() {
            return None;
        }
        sum_all(self.times(TimeSlot::Last))
    }

    fn close_sector(&mut self, index: usize, lap_elapsed: f64) -> SectorCrossing {
        let previous_splits: f64 = (0..index)
            .filter(|j| self.cleared[*j])
            .filter_map(|j| self.time(TimeSlot::Last, j))
            .sum();
        let split = round_ms(lap_elapsed - previous_splits);

        self.times[TimeSlot::Last.index()][index] = Some(split);
        self.cleared[index] = true;

        let (outcome, delta) = match self.time(TimeSlot::Best, index) {
            None => {
                self.times[TimeSlot::Best.index()][index] = Some(split);
                (CrossingOutcome::FirstTime, None)
            }
            Some(best) if split < best => {
                self.times[TimeSlot::Best.index()][index] = Some(split);
                (CrossingOutcome::NewBest { previous: best }, Some(round_ms(split - best)))
            }
            Some(best) => (CrossingOutcome::Regression { best }, Some(round_ms(split - best))),
        };

        if delta.is_some() {
            self.times[TimeSlot::Delta.index()][index] = delta;
        }

        SectorCrossing {
            index,
            split,
            outcome,
            delta,
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.sector_count() {
            return Err(LedgerError::SectorOutOfRange {
                index,
                count: self.sector_count(),
            });
        }
        Ok(())
    }
}

fn sum_all(values: &[Option<f64>]) -> Option<f64> {
    values
        .iter()
        .copied()
        .sum::<Option<f64>>()
        .map(round_ms)
}

/// Check ordering rules; `complete` additionally rejects unset entries
fn validate_layout(checkpoints: &[Checkpoint], complete: bool) -> Result<()> {
    if checkpoints.len() < MIN_SECTOR_COUNT {
        return Err(LedgerError::LayoutTooShort {
            count: checkpoints.len(),
            min: MIN_SECTOR_COUNT,
        });
    }

    let last = checkpoints.len() - 1;
    let mut previous: Option<f64> = None;
    for (index, checkpoint) in checkpoints.iter().enumerate() {
        match *checkpoint {
            Checkpoint::Unset => {
                if complete {
                    return Err(LedgerError::IncompleteLayout { index });
                }
                previous = None;
            }
            Checkpoint::FinishLine if index != last => {
                return Err(LedgerError::MisplacedFinishLine { index });
            }
            Checkpoint::FinishLine => {}
            Checkpoint::At(position) => {
                if !(0.0..=1.0).contains(&position) {
                    return Err(LedgerError::PositionOutOfRange { index, position });
                }
                if let Some(prev) = previous {
                    if position <= prev {
                        return Err(LedgerError::OutOfOrder {
                            index,
                            position,
                            previous: prev,
                        });
                    }
                }
                previous = Some(position);
            }
        }
    }
    Ok(())
}
