use std::path::Path;

use crate::error::{Result, SequenceError};
use crate::projection::PlanarProjection;
use crate::table::{InitRow, TableRow};
use crate::types::{InitialState, Vec3};

/// Build the initial state from the single init row.
///
/// Position is (x, y) from `projection` plus altitude verbatim; velocity and
/// orientation are copied from the `velocity.*` and `angle.*` columns.
pub fn extract_initial_state<P: PlanarProjection + ?Sized>(
    init: &[InitRow],
    projection: &P,
) -> Result<InitialState> {
    let row = init.first().ok_or_else(|| SequenceError::MissingInitRow {
        file: Path::new(InitRow::FILE).to_path_buf(),
    })?;

    if init.len() > 1 {
        log::warn!(
            "Init table has {} rows, using the first one",
            init.len()
        );
    }

    let (x, y) = projection.project(row.latitude, row.longitude)?;

    Ok(InitialState {
        position: Vec3::new(x, y, row.altitude),
        velocity: Vec3::new(row.velocity_x, row.velocity_y, row.velocity_z),
        orientation: Vec3::new(row.angle_x, row.angle_y, row.angle_z),
    })
}
