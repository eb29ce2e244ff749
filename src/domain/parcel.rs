use std::fmt;

use geo::MultiPolygon;
use thiserror::Error;

use crate::geometry::{GeometryError, parse_multipolygon};

/// Column layout of a parcel row
///
/// Columns 1 and 2 are descriptive and ignored. Everything from
/// [`columns::FIRST_LOCATION`] onward is a location tag.
pub mod columns {
    pub const ID: usize = 0;
    pub const LENGTH: usize = 3;
    pub const AREA: usize = 4;
    pub const BOUNDARY: usize = 5;
    pub const OWNER: usize = 6;
    pub const FIRST_LOCATION: usize = 7;
}

/// Location value meaning "not available"; dropped on construction
pub const NOT_AVAILABLE: &str = "NA";

/// A validated field of a parcel row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Length,
    Area,
    Boundary,
    Owner,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Id => "id",
            Field::Length => "length",
            Field::Area => "area",
            Field::Boundary => "boundary",
            Field::Owner => "owner",
        })
    }
}

/// Why a row could not become a [`Parcel`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParcelError {
    #[error("invalid {field}: {value:?}")]
    FieldFormat { field: Field, value: String },
    #[error("missing {0} column")]
    MissingField(Field),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A land parcel: identity, measures, owner and boundary
///
/// Immutable once built; construct with [`Parcel::from_fields`].
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    id: i64,
    length: f64,
    area: f64,
    owner: i64,
    geometry: MultiPolygon<f64>,
    locations: Vec<String>,
}

impl Parcel {
    /// Build a parcel from one row of raw fields
    ///
    /// Fields are checked in order: id, length, area, boundary, owner.
    /// The first failure is returned.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, ParcelError> {
        let field = |index: usize, name: Field| {
            fields
                .get(index)
                .map(|s| s.as_ref().trim())
                .ok_or(ParcelError::MissingField(name))
        };

        let id = parse_integer(field(columns::ID, Field::Id)?, Field::Id)?;
        let length = parse_measure(field(columns::LENGTH, Field::Length)?, Field::Length)?;
        let area = parse_measure(field(columns::AREA, Field::Area)?, Field::Area)?;
        let geometry = parse_multipolygon(field(columns::BOUNDARY, Field::Boundary)?)?;
        let owner = parse_integer(field(columns::OWNER, Field::Owner)?, Field::Owner)?;

        let locations = fields
            .iter()
            .skip(columns::FIRST_LOCATION)
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty() && *s != NOT_AVAILABLE)
            .map(str::to_string)
            .collect();

        Ok(Self {
            id,
            length,
            area,
            owner,
            geometry,
            locations,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn owner(&self) -> i64 {
        self.owner
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

impl fmt::Display for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parcel {} (length: {}, area: {}, owner: {}, polygons: {}",
            self.id,
            self.length,
            self.area,
            self.owner,
            self.geometry.0.len()
        )?;
        if !self.locations.is_empty() {
            write!(f, ", locations: {}", self.locations.join(" / "))?;
        }
        f.write_str(")")
    }
}

fn parse_integer(value: &str, field: Field) -> Result<i64, ParcelError> {
    value.parse().map_err(|_| ParcelError::FieldFormat {
        field,
        value: value.to_string(),
    })
}

fn parse_measure(value: &str, field: Field) -> Result<f64, ParcelError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(ParcelError::FieldFormat {
            field,
            value: value.to_string(),
        }),
    }
}
