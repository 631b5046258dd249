//! Gregorian → Vietnamese lunisolar calendar conversion.
//!
//! Month boundaries are the astronomical new moons observed at UTC+7; lunar
//! month 11 is the one containing the winter solstice, and in a 13-month year
//! the first month without a major solar term is the leap month.
//!
//! [`solar_to_lunar`] never fails: anything it cannot convert comes back as a
//! [`LunarConversion::Fallback`] that mirrors the solar fields.

use crate::models::{FallbackReason, LunarConversion, LunarDate, SolarDate};
use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

/// Vietnam standard time, in hours east of UTC.
const TIME_ZONE: f64 = 7.0;

/// Mean synodic month in days.
const SYNODIC_MONTH: f64 = 29.530588853;

/// Julian day of the reference new moon (1900-01-01).
const NEW_MOON_EPOCH: f64 = 2415021.076998695;

/// Offset between chrono's day count from CE and the Julian day number.
const JDN_CE_OFFSET: i64 = 1_721_425;

/// Years the astronomical series is trusted for.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1800..=2199;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Convert a caller-supplied solar date string.
pub fn solar_to_lunar(input: &str) -> LunarConversion {
    let date = match parse_solar(input) {
        Ok(date) => date,
        Err((solar, reason)) => return LunarConversion::Fallback { solar, reason },
    };

    let solar = SolarDate {
        day: date.day(),
        month: date.month(),
        year: date.year(),
    };

    if !SUPPORTED_YEARS.contains(&solar.year) {
        return LunarConversion::Fallback {
            solar,
            reason: FallbackReason::OutOfRange,
        };
    }

    LunarConversion::Converted {
        solar,
        lunar: convert_date(date),
    }
}

/// Parse the literal date part of `input`.
///
/// On failure returns whatever fields could be recovered so the fallback can
/// still echo them.
fn parse_solar(input: &str) -> Result<NaiveDate, (SolarDate, FallbackReason)> {
    let date_part = input.trim().split(['T', ' ']).next().unwrap_or_default();

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
    {
        return Ok(date);
    }

    let fields: Vec<&str> = date_part
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .take(3)
        .collect();

    if fields.is_empty() {
        let empty = SolarDate {
            day: 0,
            month: 0,
            year: 0,
        };
        return Err((empty, FallbackReason::Unparseable));
    }

    let number = |idx: usize| fields.get(idx).and_then(|s| s.parse::<u32>().ok()).unwrap_or(0);
    let year_first = fields[0].len() == 4;
    let (day, month, year) = if year_first {
        (number(2), number(1), number(0))
    } else {
        (number(0), number(1), number(2))
    };

    let solar = SolarDate {
        day,
        month,
        year: i32::try_from(year).unwrap_or(0),
    };
    Err((solar, FallbackReason::InvalidDate))
}

fn julian_day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) + JDN_CE_OFFSET
}

/// Local day (JDN) of the `k`-th new moon after the epoch.
fn new_moon_day(k: i64) -> i64 {
    let k = k as f64;
    let t = k / 1236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let dr = PI / 180.0;

    let mut jd1 = 2415020.75933 + 29.53058868 * k + 0.0001178 * t2 - 0.000000155 * t3;
    jd1 += 0.00033 * ((166.56 + 132.87 * t - 0.009173 * t2) * dr).sin();

    let m = 359.2242 + 29.10535608 * k - 0.0000333 * t2 - 0.00000347 * t3;
    let mpr = 306.0253 + 385.81691806 * k + 0.0107306 * t2 + 0.00001236 * t3;
    let f = 21.2964 + 390.67050646 * k - 0.0016528 * t2 - 0.00000239 * t3;

    let mut c1 = (0.1734 - 0.000393 * t) * (m * dr).sin() + 0.0021 * (2.0 * dr * m).sin();
    c1 = c1 - 0.4068 * (mpr * dr).sin() + 0.0161 * (dr * 2.0 * mpr).sin();
    c1 -= 0.0004 * (dr * 3.0 * mpr).sin();
    c1 = c1 + 0.0104 * (dr * 2.0 * f).sin() - 0.0051 * (dr * (m + mpr)).sin();
    c1 = c1 - 0.0074 * (dr * (m - mpr)).sin() + 0.0004 * (dr * (2.0 * f + m)).sin();
    c1 = c1 - 0.0004 * (dr * (2.0 * f - m)).sin() - 0.0006 * (dr * (2.0 * f + mpr)).sin();
    c1 = c1 + 0.0010 * (dr * (2.0 * f - mpr)).sin() + 0.0005 * (dr * (2.0 * mpr + m)).sin();

    // Difference between terrestrial and universal time.
    let delta_t = if t < -11.0 {
        0.001 + 0.000839 * t + 0.0002261 * t2 - 0.00000845 * t3 - 0.000000081 * t * t3
    } else {
        -0.000278 + 0.000265 * t + 0.000262 * t2
    };

    let jd_new = jd1 + c1 - delta_t;
    (jd_new + 0.5 + TIME_ZONE / 24.0).floor() as i64
}

/// Sun's ecliptic longitude at local midnight of `jdn`, as one of 12 sectors
/// of 30° (0 = spring equinox, 9 = winter solstice).
fn sun_longitude_sector(jdn: i64) -> i64 {
    let t = (jdn as f64 - 2451545.5 - TIME_ZONE / 24.0) / 36525.0;
    let t2 = t * t;
    let dr = PI / 180.0;

    let m = 357.52910 + 35999.05030 * t - 0.0001559 * t2 - 0.00000048 * t * t2;
    let l0 = 280.46645 + 36000.76983 * t + 0.0003032 * t2;
    let mut dl = (1.914600 - 0.004817 * t - 0.000014 * t2) * (dr * m).sin();
    dl = dl + (0.019993 - 0.000101 * t) * (dr * 2.0 * m).sin() + 0.000290 * (dr * 3.0 * m).sin();

    let mut l = (l0 + dl) * dr;
    l -= PI * 2.0 * (l / (PI * 2.0)).floor();
    (l / PI * 6.0).floor() as i64
}

/// First day of lunar month 11 of `year`.
fn lunar_month_11(year: i32) -> i64 {
    let dec_31 = NaiveDate::from_ymd_opt(year, 12, 31)
        .map(julian_day_number)
        .unwrap_or_default();
    let off = dec_31 - 2415021;
    let k = (off as f64 / SYNODIC_MONTH).floor() as i64;

    let new_moon = new_moon_day(k);
    if sun_longitude_sector(new_moon) >= 9 {
        new_moon_day(k - 1)
    } else {
        new_moon
    }
}

/// Index (after month 11) of the leap month in a 13-month year starting at `a11`.
fn leap_month_offset(a11: i64) -> i64 {
    let k = ((a11 as f64 - NEW_MOON_EPOCH) / SYNODIC_MONTH + 0.5).floor() as i64;

    let mut i = 1;
    let mut arc = sun_longitude_sector(new_moon_day(k + i));
    loop {
        let last = arc;
        i += 1;
        arc = sun_longitude_sector(new_moon_day(k + i));
        if arc == last || i >= 14 {
            break;
        }
    }
    i - 1
}

fn convert_date(date: NaiveDate) -> LunarDate {
    let year = date.year();
    let day_number = julian_day_number(date);
    // The mean-month estimate can be off by one lunation either way.
    let mut k = ((day_number as f64 - NEW_MOON_EPOCH) / SYNODIC_MONTH).floor() as i64;
    while new_moon_day(k + 1) <= day_number {
        k += 1;
    }
    while new_moon_day(k) > day_number {
        k -= 1;
    }
    let month_start = new_moon_day(k);

    let mut a11 = lunar_month_11(year);
    let mut b11 = a11;
    let mut lunar_year;
    if a11 >= month_start {
        lunar_year = year;
        a11 = lunar_month_11(year - 1);
    } else {
        lunar_year = year + 1;
        b11 = lunar_month_11(year + 1);
    }

    let lunar_day = day_number - month_start + 1;
    let diff = ((month_start - a11) as f64 / 29.0).floor() as i64;
    let mut is_leap_month = false;
    let mut lunar_month = diff + 11;

    if b11 - a11 > 365 {
        let leap_diff = leap_month_offset(a11);
        if diff >= leap_diff {
            lunar_month = diff + 10;
            is_leap_month = diff == leap_diff;
        }
    }
    if lunar_month > 12 {
        lunar_month -= 12;
    }
    if lunar_month >= 11 && diff < 4 {
        lunar_year -= 1;
    }

    LunarDate {
        day: lunar_day as u32,
        month: lunar_month as u32,
        year: lunar_year,
        is_leap_month,
    }
}
