//! Dataset abstraction over multi-location hourly archives.

use std::collections::HashMap;

use crate::channel::Channel;
use crate::error::{ReaderError, ReaderResult};

/// A gridded hourly archive addressed by flat spatial index.
///
/// Every channel holds, per location, a chronological sequence of
/// `records * sub_steps` samples (e.g. one record per day with 24 hourly
/// sub-steps).
pub trait ResourceDataset {
    /// Extent of the flattened spatial axis.
    fn num_locations(&self) -> usize;

    /// Whether the archive carries this channel.
    fn has_channel(&self, channel: Channel) -> bool;

    /// Read every time sample of one channel at one location, flattened in
    /// chronological order.
    fn read_location(&self, channel: Channel, index: usize) -> ReaderResult<Vec<f64>>;

    /// Fail with `IndexOutOfRange` when `index` is beyond the spatial extent.
    fn check_index(&self, index: usize) -> ReaderResult<()> {
        let limit = self.num_locations();
        if index >= limit {
            return Err(ReaderError::IndexOutOfRange { index, limit });
        }
        Ok(())
    }
}

/// In-memory archive, stored location-major.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    num_locations: usize,
    steps_per_location: usize,
    channels: HashMap<Channel, Vec<f64>>,
}

impl MemoryDataset {
    /// Create an empty archive with the given spatial and temporal extent.
    pub fn new(num_locations: usize, steps_per_location: usize) -> Self {
        Self {
            num_locations,
            steps_per_location,
            channels: HashMap::new(),
        }
    }

    pub fn steps_per_location(&self) -> usize {
        self.steps_per_location
    }

    /// Attach a whole channel laid out as `[location][step]`.
    pub fn with_channel(mut self, channel: Channel, values: Vec<f64>) -> ReaderResult<Self> {
        let expected = self.num_locations * self.steps_per_location;
        if values.len() != expected {
            return Err(ReaderError::invalid_format(format!(
                "{} holds {} values, expected {} ({} locations x {} steps)",
                channel,
                values.len(),
                expected,
                self.num_locations,
                self.steps_per_location
            )));
        }
        self.channels.insert(channel, values);
        Ok(self)
    }

    /// Attach a channel where every location carries the same series.
    pub fn with_uniform_channel(self, channel: Channel, series: &[f64]) -> ReaderResult<Self> {
        let values = series
            .iter()
            .copied()
            .cycle()
            .take(series.len() * self.num_locations)
            .collect();
        self.with_channel(channel, values)
    }

    /// Overwrite one location of a channel, creating the channel (NaN-filled)
    /// when absent.
    pub fn set_location(
        &mut self,
        channel: Channel,
        index: usize,
        series: &[f64],
    ) -> ReaderResult<()> {
        self.check_index(index)?;
        if series.len() != self.steps_per_location {
            return Err(ReaderError::invalid_format(format!(
                "series for {} has {} steps, expected {}",
                channel,
                series.len(),
                self.steps_per_location
            )));
        }
        let total = self.num_locations * self.steps_per_location;
        let values = self
            .channels
            .entry(channel)
            .or_insert_with(|| vec![f64::NAN; total]);
        let start = index * self.steps_per_location;
        values[start..start + self.steps_per_location].copy_from_slice(series);
        Ok(())
    }
}

impl ResourceDataset for MemoryDataset {
    fn num_locations(&self) -> usize {
        self.num_locations
    }

    fn has_channel(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    fn read_location(&self, channel: Channel, index: usize) -> ReaderResult<Vec<f64>> {
        let values = self
            .channels
            .get(&channel)
            .ok_or_else(|| ReaderError::MissingVariable(channel.variable_name().to_string()))?;
        self.check_index(index)?;
        let start = index * self.steps_per_location;
        Ok(values[start..start + self.steps_per_location].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryDataset {
        // 3 locations x 4 steps, value = location * 10 + step
        let values = (0..3)
            .flat_map(|loc| (0..4).map(move |step| (loc * 10 + step) as f64))
            .collect();
        MemoryDataset::new(3, 4)
            .with_channel(Channel::T2m, values)
            .unwrap()
    }

    #[test]
    fn test_read_location() {
        let ds = sample();
        assert_eq!(
            ds.read_location(Channel::T2m, 1).unwrap(),
            vec![10.0, 11.0, 12.0, 13.0]
        );
    }

    #[test]
    fn test_missing_channel() {
        let ds = sample();
        let err = ds.read_location(Channel::Ps, 0).unwrap_err();
        assert!(matches!(err, ReaderError::MissingVariable(name) if name == "PS"));
    }

    #[test]
    fn test_index_out_of_range() {
        let ds = sample();
        let err = ds.read_location(Channel::T2m, 3).unwrap_err();
        assert!(matches!(
            err,
            ReaderError::IndexOutOfRange { index: 3, limit: 3 }
        ));
    }

    #[test]
    fn test_with_channel_length_mismatch() {
        let err = MemoryDataset::new(2, 3)
            .with_channel(Channel::Ps, vec![0.0; 5])
            .unwrap_err();
        assert!(matches!(err, ReaderError::InvalidFormat(_)));
    }

    #[test]
    fn test_set_location_creates_channel() {
        let mut ds = MemoryDataset::new(2, 2);
        ds.set_location(Channel::U50m, 1, &[4.0, 5.0]).unwrap();
        assert!(ds.has_channel(Channel::U50m));
        assert_eq!(ds.read_location(Channel::U50m, 1).unwrap(), vec![4.0, 5.0]);
        assert!(ds.read_location(Channel::U50m, 0).unwrap()[0].is_nan());
    }

    #[test]
    fn test_uniform_channel() {
        let ds = MemoryDataset::new(3, 2)
            .with_uniform_channel(Channel::Swgdn, &[1.0, 2.0])
            .unwrap();
        assert_eq!(ds.read_location(Channel::Swgdn, 2).unwrap(), vec![1.0, 2.0]);
    }
}
