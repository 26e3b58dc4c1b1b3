//! Synchronized playback of multi-rate navigation recordings
//!
//! A recording (sequence) holds IMU samples at a high rate, camera frames and
//! barometric heights at a lower irregular rate, an initial state, and on the
//! training split a ground-truth track. [`Sequence`] loads the tables once and
//! hands out [`SequenceIter`]s that step through the IMU clock, attaching the
//! camera frame with the exact same timestamp when there is one.
//!
//! ```no_run
//! use nav_sequence_rs::{Sequence, SequenceConfig, SequenceId, Split};
//!
//! # fn main() -> nav_sequence_rs::Result<()> {
//! let sequence = Sequence::open(SequenceId::new(Split::Training, 1), &SequenceConfig::default())?;
//! let initial = sequence.initial_state()?;
//! println!("start at {:?}", initial.position);
//!
//! for step in sequence.steps() {
//!     let step = step?;
//!     if let Some(height) = step.barometric_height() {
//!         println!("{}: baro {:.2} m", step.timestamp(), height);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod image_source;
pub mod initial_state;
pub mod projection;
pub mod sequence;
pub mod table;
pub mod types;

pub use camera::{join_camera_table, CameraTable};
pub use config::SequenceConfig;
pub use error::{ErrorKind, Result, SequenceError};
pub use image_source::{ImageSource, PngImageSource};
pub use initial_state::extract_initial_state;
pub use projection::{PlanarProjection, UtmCoordinate, UtmProjection};
pub use sequence::{Advance, CameraFrame, Sequence, SequenceIter, Step};
pub use table::SequenceTables;
pub use types::{
    CameraSample, GroundTruthSample, ImuSample, InitialState, SequenceId, Split, Timestamp, Vec3,
};
