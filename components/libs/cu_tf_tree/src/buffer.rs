use crate::error::{TfError, TfResult};
use crate::interpolation::sample_at;
use crate::types::{Stamp, StampedIsometry, TransformType};
use std::collections::VecDeque;

/// Time series of one parent -> child edge.
///
/// A static buffer keeps a single sample that every push replaces.
/// A dynamic buffer keeps samples sorted by stamp, optionally bounded to
/// `max_history` entries (oldest dropped first).
///
/// Next to the lookup view, every pushed sample is also kept in commit order,
/// replaced or overwritten ones included, under the same `max_history` bound.
#[derive(Clone, Debug)]
pub struct TransformBuffer {
    kind: TransformType,
    samples: VecDeque<StampedIsometry>,
    committed: VecDeque<StampedIsometry>,
    max_history: Option<usize>,
}

impl TransformBuffer {
    pub fn new(kind: TransformType) -> Self {
        Self::with_max_history(kind, None)
    }

    pub fn with_max_history(kind: TransformType, max_history: Option<usize>) -> Self {
        Self {
            kind,
            samples: VecDeque::new(),
            committed: VecDeque::new(),
            max_history: max_history.map(|max| max.max(1)),
        }
    }

    pub fn kind(&self) -> TransformType {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Store a sample.
    /// Out of order stamps are inserted in place, an equal stamp overwrites.
    pub fn push(&mut self, sample: StampedIsometry) {
        self.committed.push_back(sample.clone());
        if let Some(max) = self.max_history {
            while self.committed.len() > max {
                self.committed.pop_front();
            }
        }
        match self.kind {
            TransformType::Static => {
                self.samples.clear();
                self.samples.push_back(sample);
            }
            TransformType::Dynamic => {
                match self
                    .samples
                    .binary_search_by_key(&sample.stamp(), |s| s.stamp())
                {
                    Ok(i) => self.samples[i] = sample,
                    Err(i) => self.samples.insert(i, sample),
                }
                if let Some(max) = self.max_history {
                    while self.samples.len() > max {
                        self.samples.pop_front();
                    }
                }
            }
        }
    }

    /// The sample with the highest stamp.
    pub fn latest(&self) -> TfResult<&StampedIsometry> {
        self.samples
            .back()
            .ok_or_else(|| TfError::CouldNotFindTransform("no samples in buffer".to_string()))
    }

    /// Value of the edge at `time`. Static edges ignore `time`.
    pub fn at(&self, time: Stamp) -> TfResult<StampedIsometry> {
        match self.kind {
            TransformType::Static => self.latest().cloned(),
            TransformType::Dynamic => sample_at(&self.samples, time),
        }
    }

    /// Stamps of the oldest and latest samples.
    pub fn time_range(&self) -> Option<(Stamp, Stamp)> {
        Some((self.samples.front()?.stamp(), self.samples.back()?.stamp()))
    }

    /// All stored samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &StampedIsometry> {
        self.samples.iter()
    }

    /// Every pushed sample in push order, including the ones a later push
    /// replaced or overwrote.
    pub fn committed(&self) -> impl Iterator<Item = &StampedIsometry> {
        self.committed.iter()
    }
}
