//! Time-synchronized playback of one recorded sequence
//!
//! The IMU table is the master clock: every IMU row yields exactly one [`Step`],
//! in table order. A step carries the camera frame and barometric height whose
//! timestamp equals the IMU timestamp exactly (first match wins), and on the
//! training split the ground-truth row at the same position.
//!
//! Tables are loaded and joined once at construction and never change after.
//! The only mutable state is the cursor inside [`SequenceIter`]; a new
//! iterator from [`Sequence::steps`] replays from the start.

use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use image::GrayImage;

use crate::camera::{image_path, CameraTable};
use crate::config::SequenceConfig;
use crate::error::{Result, SequenceError};
use crate::image_source::{ImageSource, PngImageSource};
use crate::initial_state::extract_initial_state;
use crate::projection::{PlanarProjection, UtmProjection};
use crate::table::{row_at, GroundTruthRow, ImuRow, InitRow, SequenceTables, TableRow};
use crate::types::{
    CameraSample, GroundTruthSample, ImuSample, InitialState, SequenceId, Split, Timestamp, Vec3,
};

/// Camera data attached to a step
#[derive(Clone, Debug)]
pub enum CameraFrame {
    /// A capture shares the IMU timestamp
    Captured {
        sample: CameraSample,
        image: GrayImage,
    },
    /// No capture at this timestamp
    Absent,
}

impl CameraFrame {
    pub fn is_captured(&self) -> bool {
        matches!(self, CameraFrame::Captured { .. })
    }

    pub fn sample(&self) -> Option<&CameraSample> {
        match self {
            CameraFrame::Captured { sample, .. } => Some(sample),
            CameraFrame::Absent => None,
        }
    }

    pub fn image(&self) -> Option<&GrayImage> {
        match self {
            CameraFrame::Captured { image, .. } => Some(image),
            CameraFrame::Absent => None,
        }
    }
}

/// One IMU tick with everything that co-occurs with it
#[derive(Clone, Debug)]
pub struct Step {
    /// Position of the IMU row this step was built from
    pub index: usize,
    pub imu: ImuSample,
    pub camera: CameraFrame,
    split: Split,
    ground_truth: Option<GroundTruthSample>,
}

impl Step {
    pub fn timestamp(&self) -> Timestamp {
        self.imu.timestamp
    }

    pub fn acceleration(&self) -> &Vec3 {
        &self.imu.acceleration
    }

    pub fn angular_velocity(&self) -> &Vec3 {
        &self.imu.angular_velocity
    }

    pub fn image(&self) -> Option<&GrayImage> {
        self.camera.image()
    }

    pub fn barometric_height(&self) -> Option<f64> {
        self.camera.sample().map(|sample| sample.barometric_height)
    }

    /// Ground truth at this step; an error on splits that do not record it
    pub fn ground_truth(&self) -> Result<&GroundTruthSample> {
        self.ground_truth
            .as_ref()
            .ok_or(SequenceError::GroundTruthUnavailable { split: self.split })
    }
}

/// Outcome of pulling the iterator
#[derive(Clone, Debug)]
pub enum Advance {
    Step(Step),
    /// Every IMU row has been emitted. Returned again on every later pull.
    EndOfSequence,
}

impl Advance {
    pub fn into_step(self) -> Option<Step> {
        match self {
            Advance::Step(step) => Some(step),
            Advance::EndOfSequence => None,
        }
    }
}

/// Immutable snapshot of one sequence's tables
pub struct Sequence<S: ImageSource = PngImageSource> {
    id: SequenceId,
    dir: PathBuf,
    image_folder: String,
    imu: Vec<ImuRow>,
    camera: CameraTable,
    init: Vec<InitRow>,
    ground_truth: Option<Vec<GroundTruthRow>>,
    image_source: S,
}

impl Sequence<PngImageSource> {
    /// Load `{base_path}/{split}/sequence_{id}` and prepare it for playback
    pub fn open(id: SequenceId, config: &SequenceConfig) -> Result<Self> {
        let dir = config.sequence_dir(&id);
        let tables = SequenceTables::load(&dir, id.split)?;
        Self::from_tables(id, dir, config.image_folder.clone(), tables, PngImageSource)
    }
}

impl<S: ImageSource> Sequence<S> {
    /// Build from tables that are already in memory.
    ///
    /// Fails if the init table is empty, if the training split lacks ground
    /// truth, if ground truth and IMU row counts differ, or if the camera join
    /// finds duplicate keys.
    pub fn from_tables(
        id: SequenceId,
        dir: impl Into<PathBuf>,
        image_folder: impl Into<String>,
        tables: SequenceTables,
        image_source: S,
    ) -> Result<Self> {
        let dir = dir.into();
        let SequenceTables {
            images,
            barometer,
            imu,
            init,
            ground_truth,
        } = tables;

        if init.is_empty() {
            return Err(SequenceError::MissingInitRow {
                file: dir.join(InitRow::FILE),
            });
        }

        let ground_truth = match (id.split.has_ground_truth(), ground_truth) {
            (true, Some(rows)) => {
                // Ground truth is paired by position, so the tables must line up
                if rows.len() != imu.len() {
                    return Err(SequenceError::malformed(
                        dir.join(GroundTruthRow::FILE),
                        format!(
                            "{} ground truth rows for {} IMU rows",
                            rows.len(),
                            imu.len()
                        ),
                    ));
                }
                Some(rows)
            }
            (true, None) => {
                return Err(SequenceError::NotFound {
                    path: dir.join(GroundTruthRow::FILE),
                })
            }
            (false, rows) => {
                if rows.is_some() {
                    log::debug!("Ignoring ground truth supplied for {}", id);
                }
                None
            }
        };

        let camera = CameraTable::join(&images, &barometer).map_err(|e| e.rooted(&dir))?;

        let non_increasing = imu
            .windows(2)
            .filter(|pair| pair[1].timestamp <= pair[0].timestamp)
            .count();
        if non_increasing > 0 {
            log::warn!(
                "{}: {} IMU timestamps do not increase over their predecessor",
                id,
                non_increasing
            );
        }
        if camera.duplicate_timestamps() > 0 {
            log::warn!(
                "{}: {} camera rows share a timestamp with an earlier row and will be skipped",
                id,
                camera.duplicate_timestamps()
            );
        }

        log::info!(
            "Opened {}: {} IMU rows, {} camera frames ({} images, {} barometer rows){}",
            id,
            imu.len(),
            camera.len(),
            images.len(),
            barometer.len(),
            if ground_truth.is_some() { ", with ground truth" } else { "" }
        );

        Ok(Self {
            id,
            dir,
            image_folder: image_folder.into(),
            imu,
            camera,
            init,
            ground_truth,
            image_source,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of steps a full pass emits
    pub fn len(&self) -> usize {
        self.imu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imu.is_empty()
    }

    pub fn camera_table(&self) -> &CameraTable {
        &self.camera
    }

    pub fn has_ground_truth(&self) -> bool {
        self.ground_truth.is_some()
    }

    pub fn image_source(&self) -> &S {
        &self.image_source
    }

    /// Initial state with position projected to UTM
    pub fn initial_state(&self) -> Result<InitialState> {
        self.initial_state_with(&UtmProjection::new())
    }

    pub fn initial_state_with<P: PlanarProjection + ?Sized>(&self, projection: &P) -> Result<InitialState> {
        extract_initial_state(&self.init, projection).map_err(|e| e.rooted(&self.dir))
    }

    /// Fresh forward-only pass starting at the first IMU row
    pub fn steps(&self) -> SequenceIter<'_, S> {
        SequenceIter {
            sequence: self,
            cursor: 0,
            failed: false,
        }
    }

    fn step_at(&self, index: usize) -> Result<Step> {
        let imu = row_at(&self.imu, index)?.to_sample();

        let ground_truth = match &self.ground_truth {
            Some(rows) => Some(row_at(rows, index)?.to_sample()),
            None => None,
        };

        let camera = match self.camera.find(imu.timestamp) {
            Some(sample) => {
                let path = image_path(&self.dir, &self.image_folder, sample);
                let image = self.image_source.load_gray(&path)?;
                CameraFrame::Captured {
                    sample: sample.clone(),
                    image,
                }
            }
            None => CameraFrame::Absent,
        };

        Ok(Step {
            index,
            imu,
            camera,
            split: self.id.split,
            ground_truth,
        })
    }
}

/// Cursor over a [`Sequence`].
///
/// Pulling needs `&mut self`, so one iterator cannot be polled from two places
/// at once. Independent passes each take their own iterator.
pub struct SequenceIter<'a, S: ImageSource = PngImageSource> {
    sequence: &'a Sequence<S>,
    cursor: usize,
    failed: bool,
}

impl<'a, S: ImageSource> SequenceIter<'a, S> {
    /// Emit the step at the cursor, or `EndOfSequence` once every row is out.
    ///
    /// The cursor moves only after a step is fully built, so a step whose
    /// image failed to load is attempted again on the next call.
    pub fn advance(&mut self) -> Result<Advance> {
        if self.cursor >= self.sequence.len() {
            return Ok(Advance::EndOfSequence);
        }

        let step = self.sequence.step_at(self.cursor)?;
        self.cursor += 1;
        Ok(Advance::Step(step))
    }

    /// Index of the next IMU row to emit
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.sequence.len().saturating_sub(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Fail-fast adapter over [`SequenceIter::advance`]: after the first `Err`
/// the iterator ends. Use `advance` directly to retry a failed step.
impl<S: ImageSource> Iterator for SequenceIter<'_, S> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.advance() {
            Ok(Advance::Step(step)) => Some(Ok(step)),
            Ok(Advance::EndOfSequence) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.remaining();
        (remaining.min(1), Some(remaining))
    }
}

impl<S: ImageSource> FusedIterator for SequenceIter<'_, S> {}
