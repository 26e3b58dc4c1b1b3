//! Camera table: image captures joined with their barometer readings
//!
//! The barometer table's `index` column names the image capture each reading
//! belongs to. Captures with no reading are dropped from the join.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{Result, SequenceError};
use crate::table::{BarometerRow, ImageRow, TableRow};
use crate::types::{CameraSample, Timestamp};

/// Inner-join images and barometer readings on `image_index == index`.
///
/// Output keeps images-table order and has at most `min(images, barometer)` rows.
/// Duplicate keys on either side are rejected.
pub fn join_camera_table(images: &[ImageRow], barometer: &[BarometerRow]) -> Result<Vec<CameraSample>> {
    let mut heights: HashMap<u64, f64> = HashMap::with_capacity(barometer.len());
    for row in barometer {
        if heights.insert(row.index, row.barometric_height).is_some() {
            return Err(SequenceError::malformed(
                BarometerRow::FILE,
                format!("duplicate index {}", row.index),
            ));
        }
    }

    let mut seen: HashSet<u64> = HashSet::with_capacity(images.len());
    let mut joined = Vec::with_capacity(images.len().min(barometer.len()));
    let mut dropped = 0usize;

    for image in images {
        if !seen.insert(image.image_index) {
            return Err(SequenceError::malformed(
                ImageRow::FILE,
                format!("duplicate image_index {}", image.image_index),
            ));
        }

        match heights.get(&image.image_index) {
            Some(&barometric_height) => joined.push(CameraSample {
                image_index: image.image_index,
                timestamp: image.timestamp,
                barometric_height,
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!(
            "Camera join dropped {} of {} images without a barometer reading",
            dropped,
            images.len()
        );
    }

    Ok(joined)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum TimestampKey {
    Int(i64),
    Float(u64),
}

/// Exact-match key for a timestamp; `None` for NaN, which matches nothing
fn timestamp_key(timestamp: Timestamp) -> Option<TimestampKey> {
    if let Some(value) = timestamp.as_i64() {
        return Some(TimestampKey::Int(value));
    }
    // Non-integral, so never a signed zero
    let value = timestamp.as_f64();
    (!value.is_nan()).then(|| TimestampKey::Float(value.to_bits()))
}

/// Joined camera rows with a first-match lookup by exact timestamp
#[derive(Clone, Debug, Default)]
pub struct CameraTable {
    rows: Vec<CameraSample>,
    first_by_timestamp: HashMap<TimestampKey, usize>,
    duplicate_timestamps: usize,
}

impl CameraTable {
    pub fn new(rows: Vec<CameraSample>) -> Self {
        let mut first_by_timestamp = HashMap::with_capacity(rows.len());
        let mut duplicate_timestamps = 0;

        for (position, row) in rows.iter().enumerate() {
            let Some(key) = timestamp_key(row.timestamp) else {
                continue;
            };
            match first_by_timestamp.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
                Entry::Occupied(_) => duplicate_timestamps += 1,
            }
        }

        Self {
            rows,
            first_by_timestamp,
            duplicate_timestamps,
        }
    }

    /// Join and index in one go
    pub fn join(images: &[ImageRow], barometer: &[BarometerRow]) -> Result<Self> {
        Ok(Self::new(join_camera_table(images, barometer)?))
    }

    /// First row (table order) whose timestamp equals `timestamp` exactly
    pub fn find(&self, timestamp: Timestamp) -> Option<&CameraSample> {
        let key = timestamp_key(timestamp)?;
        self.first_by_timestamp
            .get(&key)
            .map(|&position| &self.rows[position])
    }

    /// Rows that share a timestamp with an earlier row and can never be emitted
    pub fn duplicate_timestamps(&self) -> usize {
        self.duplicate_timestamps
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Path of the image for `sample` inside the sequence directory
pub fn image_path(sequence_dir: &Path, image_folder: &str, sample: &CameraSample) -> std::path::PathBuf {
    sequence_dir
        .join(image_folder)
        .join(format!("{}.png", sample.image_index))
}
