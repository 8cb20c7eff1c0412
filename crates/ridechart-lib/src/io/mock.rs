use super::session::{ConfidenceBand, SessionSeries};
use crate::signal::TimeSeries;
use rand::{rngs::StdRng, Rng, SeedableRng};

const BASE_WATTS: f64 = 180.0;
const INTERVAL_WATTS: f64 = 140.0;
const REST_HR: f64 = 95.0;
/// Heart rate rise per watt above zero.
const HR_PER_WATT: f64 = 0.22;
/// First-order lag of heart rate behind power, in samples.
const HR_TAU_S: f64 = 30.0;

/// Reproducible 1 Hz ride of `seconds` samples.
///
/// Power alternates between endurance and 3-minute intervals with noise, heart rate
/// follows with a lag, and roughly 0.5% of samples on each channel are dropouts.
pub fn mock_session(seconds: usize, seed: u64) -> SessionSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut power = Vec::with_capacity(seconds);
    let mut heart_rate = Vec::with_capacity(seconds);
    let mut lower = Vec::with_capacity(seconds);
    let mut upper = Vec::with_capacity(seconds);
    let mut hr = REST_HR;

    for i in 0..seconds {
        let in_interval = (i / 180) % 4 == 3;
        let target = BASE_WATTS + if in_interval { INTERVAL_WATTS } else { 0.0 };
        let watts = (target + rng.gen_range(-25.0..25.0)).max(0.0);
        hr += (REST_HR + HR_PER_WATT * watts - hr) / HR_TAU_S;

        let ci = 5.0f64.max(0.05 * watts);
        lower.push(watts - ci);
        upper.push(watts + ci);
        power.push(if rng.gen_bool(0.005) { f64::NAN } else { watts });
        heart_rate.push(if rng.gen_bool(0.005) {
            f64::NAN
        } else {
            hr.round()
        });
    }

    let power = TimeSeries::per_second(power);
    SessionSeries {
        time: Some(power.time_axis()),
        power: power.data,
        heart_rate,
        band: Some(ConfidenceBand { lower, upper }),
    }
}
