//! Daily new infections and deaths around a national lockdown.

use crate::error::{MetricsError, Result};
use crate::metrics::{before, daily_delta, max_of, normalize, select_country, values};
use crate::models::{
    Field, LockdownEvent, LockdownTimeline, Marker, Observation, TimelinePoint,
    LOCKDOWN_FOLLOW_UP_LABEL, LOCKDOWN_START_LABEL,
};

/// Build the lockdown timeline for `event.country`.
///
/// Rows dated on or after `event.cutoff` are dropped before any delta is
/// computed, so the normalization peak only considers the kept window.
///
/// Fails with `NotFound` if the country is absent and with `EmptyInput` if
/// the cutoff leaves no rows.
pub fn lockdown_timeline(
    observations: &[Observation],
    event: &LockdownEvent,
) -> Result<LockdownTimeline> {
    let rows = before(&select_country(observations, &event.country)?, event.cutoff);
    if rows.is_empty() {
        return Err(MetricsError::EmptyInput(format!(
            "No rows for {} before {}",
            event.country, event.cutoff
        )));
    }

    let infections = daily_delta(&values(&rows, Field::Confirmed));
    let deaths = daily_delta(&values(&rows, Field::Deaths));
    let infections_norm = normalize(&infections);
    let deaths_norm = normalize(&deaths);

    let points = rows
        .iter()
        .enumerate()
        .map(|(i, row)| TimelinePoint {
            date: row.date,
            new_infections: infections[i],
            new_deaths: deaths[i],
            infections_normalized: infections_norm[i],
            deaths_normalized: deaths_norm[i],
        })
        .collect();

    Ok(LockdownTimeline {
        country: event.country.clone(),
        points,
        peak_infections: max_of(&infections),
        peak_deaths: max_of(&deaths),
        markers: vec![
            Marker {
                date: event.start,
                label: LOCKDOWN_START_LABEL.to_string(),
            },
            Marker {
                date: event.follow_up,
                label: LOCKDOWN_FOLLOW_UP_LABEL.to_string(),
            },
        ],
    })
}
