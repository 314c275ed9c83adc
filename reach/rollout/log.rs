use std::path::Path;

use tch::{Device, Kind, TchError, Tensor};

use crate::env::{Observation, DIMS};

/// Fixed-capacity record of the observations seen during an episode, stored
/// as a `[capacity, 3]` float tensor. Rows past the last push stay zero.
#[must_use]
#[derive(Debug)]
pub struct ObservationLog {
    rows: Tensor,
    len: i64,
    capacity: i64,
}

impl ObservationLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity as i64;

        Self {
            rows: Tensor::zeros([capacity, DIMS as i64], (Kind::Float, Device::Cpu)),
            len: 0,
            capacity,
        }
    }

    /// Appends `observation`. Returns `false` and drops the row once the log
    /// is full.
    pub fn push(&mut self, observation: &Observation) -> bool {
        if self.is_full() {
            return false;
        }

        self.rows
            .get(self.len)
            .copy_(&Tensor::from_slice(observation.as_slice()));
        self.len += 1;
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Observation> {
        let index = index as i64;
        if index >= self.len {
            return None;
        }

        let mut observation = [0.0; DIMS];
        for (axis, value) in observation.iter_mut().enumerate() {
            *value = self.rows.double_value(&[index, axis as i64]) as f32;
        }
        Some(observation)
    }

    /// The recorded rows, without the zero padding.
    pub fn rows(&self) -> Tensor {
        self.rows.narrow(0, 0, self.len)
    }

    pub fn clear(&mut self) {
        _ = self.rows.zero_();
        self.len = 0;
    }

    /// Writes the whole buffer, padding included, as a `.npy` array.
    pub fn export<T>(&self, path: T) -> Result<(), TchError>
    where
        T: AsRef<Path>,
    {
        self.rows.write_npy(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_rows_past_capacity() {
        let mut log = ObservationLog::new(2);
        assert!(log.is_empty());

        assert!(log.push(&[0.0, 0.0, 0.0]));
        assert!(log.push(&[1.0, 2.0, 3.0]));
        assert!(!log.push(&[4.0, 4.0, 4.0]));

        assert!(log.is_full());
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1), Some([1.0, 2.0, 3.0]));
        assert_eq!(log.get(2), None);
    }

    #[test]
    fn rows_skip_padding() {
        let mut log = ObservationLog::new(14);
        log.push(&[1.0, 1.0, 1.0]);

        assert_eq!(log.rows().size(), vec![1, 3]);
        assert_eq!(log.capacity(), 14);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.get(0), None);
    }
}
