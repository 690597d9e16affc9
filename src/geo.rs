//! Random coordinates and the request body they are sent in.
//!
//! The elevation service takes a JSON array of `[longitude, latitude]` pairs.
//! Numbers are written in fixed-point notation with six fractional digits.

use rand::Rng;
use serde::ser::{Serialize, SerializeTuple, Serializer};
use serde_json::ser::Formatter;
use std::io;
use std::ops::RangeInclusive;

pub const LATITUDES: RangeInclusive<f64> = 21.0..=23.0;
pub const LONGITUDES: RangeInclusive<f64> = 121.0..=123.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Draws latitude and longitude independently and uniformly from the fixed bounds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            lat: rng.gen_range(LATITUDES),
            lon: rng.gen_range(LONGITUDES),
        }
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.lon)?;
        pair.serialize_element(&self.lat)?;
        pair.end()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Batch {
    coordinates: Vec<Coordinate>,
}

impl Batch {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Self {
        Self {
            coordinates: (0..size).map(|_| Coordinate::random(rng)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Wire body, e.g. `[[121.123456,22.000000]]`.
    pub fn to_body(&self) -> serde_json::Result<Vec<u8>> {
        // ~24 bytes per pair
        let mut body = Vec::with_capacity(2 + self.coordinates.len() * 24);
        let mut serializer = serde_json::Serializer::with_formatter(&mut body, FixedPoint);
        self.coordinates.serialize(&mut serializer)?;
        Ok(body)
    }
}

impl From<Vec<Coordinate>> for Batch {
    fn from(coordinates: Vec<Coordinate>) -> Self {
        Self { coordinates }
    }
}

/// Compact JSON with every float written as `{:.6}`.
struct FixedPoint;

impl Formatter for FixedPoint {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write!(writer, "{value:.6}")
    }
}
