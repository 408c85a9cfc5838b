// Derived metrics computed from pivoted series
use super::series::{SeriesError, SeriesRow, SeriesTable};

/// Euclidean norm of three axis columns, one output row per input row.
///
/// NaN in any axis yields NaN for that row.
pub fn vector_magnitude(
    table: &SeriesTable,
    axes: &[String],
    output: &str,
) -> Result<SeriesTable, SeriesError> {
    let [x, y, z] = axes else {
        return Err(SeriesError::AxisCount(axes.len()));
    };
    let (xi, yi, zi) = (
        table.field_index(x)?,
        table.field_index(y)?,
        table.field_index(z)?,
    );

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let (vx, vy, vz) = (row.values[xi], row.values[yi], row.values[zi]);
            SeriesRow {
                time: row.time,
                values: vec![(vx * vx + vy * vy + vz * vz).sqrt()],
            }
        })
        .collect();

    Ok(SeriesTable::from_rows(vec![output.to_string()], rows))
}

/// Most recent value of `field`, or 0.0 when there is nothing to show
pub fn latest(table: &SeriesTable, field: &str) -> f64 {
    let Ok(idx) = table.field_index(field) else {
        return 0.0;
    };
    table.rows().last().map(|row| row.values[idx]).unwrap_or(0.0)
}
