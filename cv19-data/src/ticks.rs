use chrono::NaiveDate;
use log::debug;

/// Most tick labels drawn on a date axis.
pub const MAX_TICKS: usize = 20;

/// A regular tick closer than this many days to the final date is replaced
/// by the final date instead of sitting next to it.
pub const TICK_PROXIMITY_DAYS: i64 = 7;

/// Pick evenly spaced tick dates from an ascending axis.
///
/// Short axes (fewer than `max_ticks` dates) come back whole. Longer ones
/// keep every `ceil(len / max_ticks)`-th date from the first, and always
/// end on the axis' last date.
pub fn decimate(dates: &[NaiveDate], max_ticks: usize) -> Vec<NaiveDate> {
    let max_ticks = max_ticks.max(1);
    let num_ticks = dates.len();
    debug!("decimate_ticks: {} ticks", num_ticks);
    if num_ticks < max_ticks {
        return dates.to_vec();
    }
    let Some(&last_date) = dates.last() else {
        return Vec::new();
    };

    let stride = num_ticks.div_ceil(max_ticks);
    let mut ticks: Vec<NaiveDate> = dates.iter().step_by(stride).copied().collect();
    debug!(
        "decimate_ticks: decimated by /{} - {} ticks",
        stride,
        ticks.len()
    );

    if let Some(&tick_end) = ticks.last() {
        if tick_end != last_date {
            if (last_date - tick_end).num_days() < TICK_PROXIMITY_DAYS {
                debug!(
                    "decimate_ticks: end of tick range ({}) too close to last_date ({})",
                    tick_end, last_date
                );
                ticks.pop();
            } else {
                debug!("decimate_ticks: adding last_date back in");
            }
            ticks.push(last_date);
        }
    }
    ticks
}
