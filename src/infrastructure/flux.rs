// Flux query text for range-bounded series requests
use crate::application::telemetry_repository::SeriesQuery;

/// Escape a value for use inside a Flux double-quoted string literal
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Build the Flux query for `query` against `bucket`.
///
/// Field predicates are OR-combined inside parentheses so the measurement
/// filter applies to every field. Rows stay in long `_field`/`_value` form;
/// wide rows would carry empty numeric cells wherever an axis is missing, and
/// the reshaping happens in `SeriesTable::pivot`.
pub fn build_series_query(bucket: &str, query: &SeriesQuery) -> String {
    let fields = query
        .fields
        .iter()
        .map(|f| format!("r[\"_field\"] == {}", quote(f)))
        .collect::<Vec<_>>()
        .join(" or ");

    format!(
        "from(bucket: {})\n  |> range(start: {})\n  |> filter(fn: (r) => r[\"_measurement\"] == {} and ({}))\n  |> sort(columns: [\"_time\"])",
        quote(bucket),
        query.range.flux_start(),
        quote(&query.measurement),
        fields
    )
}
