//! Lenient deserializers for the v1 API, which sends most numbers as strings and uses empty
//! strings where a value is absent.

use serde::{de::Error, Deserialize, Deserializer};

/// Any scalar the API might send for a numeric-ish field.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Loose {
    Int(u64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// Reads a loose scalar, treating `null` and blank strings as absent.
fn loose<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Loose>, D::Error> {
    Ok(match Option::<Loose>::deserialize(d)? {
        Some(Loose::Str(s)) if s.trim().is_empty() => None,
        other => other,
    })
}

/// A required identifier, sent either as a number or a numeric string.
pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    opt_id(d)?.ok_or_else(|| D::Error::custom("identifier is blank"))
}

/// An optional identifier.
pub fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    match loose(d)? {
        None => Ok(None),
        Some(Loose::Int(n)) => Ok(Some(n)),
        Some(Loose::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid identifier `{s}`"))),
        Some(other) => Err(D::Error::custom(format!("invalid identifier {other:?}"))),
    }
}

/// An optional non-negative count (progress, minutes, hours). Fractional values are rounded.
pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    match loose(d)? {
        None => Ok(None),
        Some(Loose::Int(n)) => Ok(Some(n)),
        Some(Loose::Float(f)) if f >= 0.0 => Ok(Some(f.round() as u64)),
        Some(Loose::Str(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid number `{s}`")))
        }
        Some(other) => Err(D::Error::custom(format!("invalid number {other:?}"))),
    }
}

/// An optional flag, which the API sends as a boolean, `"true"`/`"false"`, or `1`/`0`.
pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    match loose(d)? {
        None => Ok(None),
        Some(Loose::Bool(b)) => Ok(Some(b)),
        Some(Loose::Int(n)) => Ok(Some(n != 0)),
        Some(Loose::Str(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(D::Error::custom(format!("invalid flag `{s}`"))),
        },
        Some(other) => Err(D::Error::custom(format!("invalid flag {other:?}"))),
    }
}

/// An optional `YYYYMMDD` date, kept as an integer. Anything other than eight digits is
/// rejected.
pub fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let raw = match loose(d)? {
        None => return Ok(None),
        Some(Loose::Int(n)) => n,
        Some(Loose::Str(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("invalid date `{s}`, expected YYYYMMDD")))?,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "invalid date {other:?}, expected YYYYMMDD"
            )))
        }
    };
    if !(10_000_000..=99_999_999).contains(&raw) {
        return Err(D::Error::custom(format!(
            "invalid date `{raw}`, expected YYYYMMDD"
        )));
    }
    Ok(Some(raw as u32))
}
