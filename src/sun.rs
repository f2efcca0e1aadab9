use chrono::{Datelike, NaiveDate};
use lambda_http::tracing::info;
use thiserror::Error;

// Reported clock times are UTC+7
pub const UTC_OFFSET_HOURS: f64 = 7.0;

const J2000: f64 = 2451545.0;
const OBLIQUITY_DEG: f64 = 23.44;
// Apparent elevation of the sun's centre at rise/set, refraction and disc included
const HORIZON_DEG: f64 = -0.83;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunEvent {
    Sunrise,
    Sunset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SunTimes {
    pub sunrise_h: u32,
    pub sunrise_m: u32,
    pub sunset_h: u32,
    pub sunset_m: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SunError {
    // Polar day or night
    #[error("sun does not rise or set on this date (cos of hour angle = {cos_hour_angle:.4})")]
    NoSunriseOrSunset { cos_hour_angle: f64 },
}

// Julian day number of the civil date (integer day starting at noon UTC)
fn julian_day_number(year: i32, month: u32, day: u32) -> i64 {
    let a = (14 - month as i64) / 12;
    let y = year as i64 + 4800 - a;
    let m = month as i64 + 12 * a - 3;
    day as i64 + (153 * m + 2) / 5 + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32045
}

/// Local time of sunrise or sunset as decimal hours in `[0, 24)`.
pub fn calc_sun_time(
    date: NaiveDate,
    coordinate: GeoCoordinate,
    event: SunEvent,
) -> Result<f64, SunError> {
    let jday = julian_day_number(date.year(), date.month(), date.day()) as f64
        - coordinate.longitude / 360.0;
    let n = jday - J2000;

    let mean_anomaly = (357.5291 + 0.98560028 * n).rem_euclid(360.0);
    let m_rad = mean_anomaly.to_radians();
    let center = 1.9148 * m_rad.sin() + 0.0200 * (2.0 * m_rad).sin() + 0.0003 * (3.0 * m_rad).sin();
    let ecliptic_longitude = (mean_anomaly + 102.9372 + center + 180.0).rem_euclid(360.0);
    let lambda_rad = ecliptic_longitude.to_radians();

    let transit = J2000 + n + 0.0053 * m_rad.sin() - 0.0069 * (2.0 * lambda_rad).sin();
    let declination = (lambda_rad.sin() * OBLIQUITY_DEG.to_radians().sin()).asin();

    let lat_rad = coordinate.latitude.to_radians();
    let cos_hour_angle = (HORIZON_DEG.to_radians().sin() - lat_rad.sin() * declination.sin())
        / (lat_rad.cos() * declination.cos());
    if !(-1.0..=1.0).contains(&cos_hour_angle) {
        return Err(SunError::NoSunriseOrSunset { cos_hour_angle });
    }
    let hour_angle = cos_hour_angle.acos();

    let julian_date = match event {
        SunEvent::Sunrise => transit - hour_angle / (2.0 * std::f64::consts::PI),
        SunEvent::Sunset => transit + hour_angle / (2.0 * std::f64::consts::PI),
    };

    // Julian dates roll over at noon; without the half-day shift the clock is 12 hours off
    let utc_hours = (julian_date + 0.5).rem_euclid(1.0) * 24.0;
    Ok((utc_hours + UTC_OFFSET_HOURS).rem_euclid(24.0))
}

// Decimal hours to (hour, minute), carrying a rounded 60th minute into the next hour
pub fn decimal_to_hm(hours: f64) -> (u32, u32) {
    let mut h = hours.floor() as u32;
    let mut m = ((hours - hours.floor()) * 60.0).round() as u32;
    if m == 60 {
        m = 0;
        h += 1;
    }
    if h == 24 {
        h = 0;
    }
    (h, m)
}

/// Sunrise and sunset for `date` at `coordinate`, or the fallback when none is given.
pub fn get_sun_times(
    date: NaiveDate,
    coordinate: Option<GeoCoordinate>,
    fallback: GeoCoordinate,
) -> Result<SunTimes, SunError> {
    let coordinate = match coordinate {
        Some(c) => {
            info!(lat = c.latitude, lon = c.longitude, "using supplied coordinate");
            c
        }
        None => {
            info!(lat = fallback.latitude, lon = fallback.longitude, "using default coordinate");
            fallback
        }
    };

    let (sunrise_h, sunrise_m) = decimal_to_hm(calc_sun_time(date, coordinate, SunEvent::Sunrise)?);
    let (sunset_h, sunset_m) = decimal_to_hm(calc_sun_time(date, coordinate, SunEvent::Sunset)?);
    Ok(SunTimes { sunrise_h, sunrise_m, sunset_h, sunset_m })
}
