use crate::endpoints::{is_dot_segment, location_params};
use crate::error::ValidationError;
use crate::types::{ParamValue, ValidatedArgs};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The eight tools exposed to MCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    SearchProperties,
    GetRandomProperties,
    AnalyzeMarket,
    GetPropertyValue,
    GetRentEstimates,
    GetSaleListings,
    GetRentalListings,
    GetPropertyDetails,
}

impl ToolName {
    pub const ALL: [ToolName; 8] = [
        ToolName::SearchProperties,
        ToolName::GetRandomProperties,
        ToolName::AnalyzeMarket,
        ToolName::GetPropertyValue,
        ToolName::GetRentEstimates,
        ToolName::GetSaleListings,
        ToolName::GetRentalListings,
        ToolName::GetPropertyDetails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchProperties => "search_properties",
            Self::GetRandomProperties => "get_random_properties",
            Self::AnalyzeMarket => "analyze_market",
            Self::GetPropertyValue => "get_property_value",
            Self::GetRentEstimates => "get_rent_estimates",
            Self::GetSaleListings => "get_sale_listings",
            Self::GetRentalListings => "get_rental_listings",
            Self::GetPropertyDetails => "get_property_details",
        }
    }

    pub fn spec(&self) -> &'static ToolSpec {
        match self {
            Self::SearchProperties => &SEARCH_PROPERTIES,
            Self::GetRandomProperties => &GET_RANDOM_PROPERTIES,
            Self::AnalyzeMarket => &ANALYZE_MARKET,
            Self::GetPropertyValue => &GET_PROPERTY_VALUE,
            Self::GetRentEstimates => &GET_RENT_ESTIMATES,
            Self::GetSaleListings => &GET_SALE_LISTINGS,
            Self::GetRentalListings => &GET_RENTAL_LISTINGS,
            Self::GetPropertyDetails => &GET_PROPERTY_DETAILS,
        }
    }

    /// Logical endpoint serving this tool for the given arguments.
    pub fn endpoint(&self, args: &ValidatedArgs) -> &'static str {
        match self {
            Self::SearchProperties => "properties",
            Self::GetRandomProperties => "properties/random",
            Self::AnalyzeMarket => "markets",
            Self::GetPropertyValue => "avm/value",
            Self::GetRentEstimates => "avm/rent/long-term",
            Self::GetSaleListings => "listings/sale",
            Self::GetRentalListings => "listings/rental/long-term",
            Self::GetPropertyDetails => match args.get_str("listingType") {
                Some("sale") => "listings/sale/{id}",
                Some("rental") => "listings/rental/long-term/{id}",
                _ => "properties/{id}",
            },
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for ToolName {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    String,
    Integer,
    Decimal,
    Enum(&'static [&'static str]),
}

impl ParamKind {
    /// JSON Schema `type` keyword.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String | Self::Enum(_) => "string",
            Self::Integer => "integer",
            Self::Decimal => "number",
        }
    }
}

/// What happens to a value above `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Reject,
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub overflow: Overflow,
}

/// Default value stored in the static table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Integer(i64),
    Text(&'static str),
}

impl Literal {
    pub fn to_param(self) -> ParamValue {
        match self {
            Self::Integer(i) => ParamValue::Integer(i),
            Self::Text(s) => ParamValue::Text(s.to_string()),
        }
    }

    pub fn to_json(self) -> Value {
        match self {
            Self::Integer(i) => Value::from(i),
            Self::Text(s) => Value::from(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Provider (camelCase) name; also the key in [`ValidatedArgs`].
    pub name: &'static str,
    /// Accepted snake_case spelling.
    pub alias: Option<&'static str>,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub bounds: Option<Bounds>,
    pub default: Option<Literal>,
    /// Substituted into the request path rather than the query string.
    pub path_segment: bool,
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            alias: None,
            kind,
            description,
            required: false,
            bounds: None,
            default: None,
            path_segment: false,
        }
    }

    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub const fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer, description)
    }

    pub const fn decimal(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Decimal, description)
    }

    pub const fn one_of(
        name: &'static str,
        allowed: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, ParamKind::Enum(allowed), description)
    }

    pub const fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some(Bounds {
            min,
            max,
            overflow: Overflow::Reject,
        });
        self
    }

    pub const fn clamped(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some(Bounds {
            min,
            max,
            overflow: Overflow::Clamp,
        });
        self
    }

    pub const fn path_segment(mut self) -> Self {
        self.path_segment = true;
        self
    }

    pub const fn default_value(mut self, value: Literal) -> Self {
        self.default = Some(value);
        self
    }

    /// First non-blank value under the provider name, then the alias.
    fn find<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a Value> {
        [Some(self.name), self.alias]
            .into_iter()
            .flatten()
            .filter_map(|key| object.get(key))
            .find(|value| !is_blank(value))
    }

    fn coerce(&self, value: &Value) -> Result<ParamValue, ValidationError> {
        match self.kind {
            ParamKind::String => {
                let text = match value {
                    Value::String(s) => s.trim().to_string(),
                    Value::Number(n) => n.to_string(),
                    _ => return Err(self.invalid_type("a string")),
                };
                if self.path_segment && is_dot_segment(&text) {
                    return Err(ValidationError::InvalidPathSegment {
                        field: self.name.to_string(),
                        got: text,
                    });
                }
                Ok(ParamValue::Text(text))
            }
            ParamKind::Integer => {
                let parsed = match value {
                    Value::Number(n) => n.as_i64().or_else(|| {
                        n.as_f64()
                            .filter(|f| f.is_finite() && f.fract() == 0.0)
                            .map(|f| f as i64)
                    }),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                let parsed = parsed.ok_or_else(|| self.invalid_type("an integer"))?;
                self.check_bounds(parsed as f64)
                    .map(|v| ParamValue::Integer(v as i64))
            }
            ParamKind::Decimal => {
                let parsed = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                }
                .filter(|f| f.is_finite());
                let parsed = parsed.ok_or_else(|| self.invalid_type("a number"))?;
                self.check_bounds(parsed).map(ParamValue::Decimal)
            }
            ParamKind::Enum(allowed) => {
                let got = match value {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                allowed
                    .iter()
                    .find(|candidate| candidate.eq_ignore_ascii_case(&got))
                    .map(|canonical| ParamValue::Text(canonical.to_string()))
                    .ok_or_else(|| ValidationError::InvalidEnum {
                        field: self.name.to_string(),
                        allowed: allowed.iter().map(|s| s.to_string()).collect(),
                        got,
                    })
            }
        }
    }

    fn check_bounds(&self, value: f64) -> Result<f64, ValidationError> {
        let Some(bounds) = self.bounds else {
            return Ok(value);
        };

        if value > bounds.max && bounds.overflow == Overflow::Clamp {
            debug!(param = self.name, requested = value, max = bounds.max, "Clamping parameter");
            return Ok(bounds.max);
        }

        if value < bounds.min || value > bounds.max {
            return Err(ValidationError::OutOfRange {
                field: self.name.to_string(),
                min: bounds.min,
                max: bounds.max,
                got: value,
            });
        }

        Ok(value)
    }

    fn invalid_type(&self, expected: &str) -> ValidationError {
        ValidationError::InvalidType {
            field: self.name.to_string(),
            expected: expected.to_string(),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Cross-field requirement checked after individual parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentRule {
    None,
    /// At least one of city, state, zipCode.
    Location,
    /// propertyId, address, or a latitude+longitude pair.
    PropertyIdentifier,
}

impl ArgumentRule {
    fn apply(self, args: &mut ValidatedArgs) -> Result<(), ValidationError> {
        match self {
            Self::None => Ok(()),
            Self::Location => {
                if location_params().iter().any(|name| args.contains(name)) {
                    Ok(())
                } else {
                    Err(ValidationError::MissingLocation)
                }
            }
            Self::PropertyIdentifier => {
                let has_pair = args.contains("latitude") && args.contains("longitude");
                if !has_pair {
                    // A lone coordinate cannot locate a property.
                    for coordinate in ["latitude", "longitude"] {
                        if args.remove(coordinate).is_some() {
                            debug!(param = coordinate, "Dropping unpaired coordinate");
                        }
                    }
                }

                if has_pair || args.contains("propertyId") || args.contains("address") {
                    Ok(())
                } else {
                    Err(ValidationError::MissingIdentifier)
                }
            }
        }
    }
}

/// Parameter contract for one tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSpec {
    pub tool: ToolName,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub rule: ArgumentRule,
}

impl ToolSpec {
    /// Turn raw client arguments into [`ValidatedArgs`].
    ///
    /// Unknown keys are ignored; `null` and blank strings count as absent.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedArgs, ValidationError> {
        let empty = Map::new();
        let object = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(ValidationError::InvalidType {
                    field: "arguments".to_string(),
                    expected: "an object".to_string(),
                })
            }
        };

        let mut args = ValidatedArgs::new();
        for param in self.params {
            match param.find(object) {
                Some(value) => args.insert(param.name, param.coerce(value)?),
                None => {
                    if let Some(default) = param.default {
                        args.insert(param.name, default.to_param());
                    } else if param.required {
                        return Err(ValidationError::MissingRequiredParameter(
                            param.name.to_string(),
                        ));
                    }
                }
            }
        }

        self.rule.apply(&mut args)?;
        Ok(args)
    }

    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

const DATA_TYPES: &[&str] = &["All", "Sale", "Rental"];
const LISTING_TYPES: &[&str] = &["sale", "rental"];
const LISTING_STATUSES: &[&str] = &["Active", "Inactive"];

const CITY: ParamSpec = ParamSpec::string("city", "City name (e.g. Austin, New York)");
const STATE: ParamSpec = ParamSpec::string("state", "Two-letter state abbreviation (e.g. TX, NY)");
const ZIP_CODE: ParamSpec =
    ParamSpec::string("zipCode", "Five-digit ZIP code (e.g. 78701)").alias("zip_code");
const BEDROOMS: ParamSpec = ParamSpec::integer("bedrooms", "Number of bedrooms").range(0.0, 10.0);
const BATHROOMS: ParamSpec =
    ParamSpec::decimal("bathrooms", "Number of bathrooms, fractions allowed").range(0.0, 10.0);
const PROPERTY_TYPE: ParamSpec =
    ParamSpec::string("propertyType", "Property type (e.g. Single Family, Condo, Townhouse)")
        .alias("property_type");
const PROPERTY_ID: ParamSpec =
    ParamSpec::string("propertyId", "RentCast property identifier").alias("property_id");
const ADDRESS: ParamSpec =
    ParamSpec::string("address", "Full property address (e.g. 123 Main St, Austin, TX 78701)");
const LATITUDE: ParamSpec =
    ParamSpec::decimal("latitude", "Latitude, used together with longitude").range(-90.0, 90.0);
const LONGITUDE: ParamSpec =
    ParamSpec::decimal("longitude", "Longitude, used together with latitude").range(-180.0, 180.0);
const SQUARE_FOOTAGE: ParamSpec =
    ParamSpec::integer("squareFootage", "Living area in square feet")
        .alias("square_footage")
        .range(1.0, 100_000.0);
const LISTING_STATUS: ParamSpec = ParamSpec::one_of(
    "status",
    LISTING_STATUSES,
    "Listing status filter: Active or Inactive",
);

const fn limit(default: i64) -> ParamSpec {
    ParamSpec::integer("limit", "Maximum number of results; values above 50 are capped at 50")
        .clamped(1.0, 50.0)
        .default_value(Literal::Integer(default))
}

static SEARCH_PROPERTIES: ToolSpec = ToolSpec {
    tool: ToolName::SearchProperties,
    description: "Search for property records. Requires at least one of city, state or zipCode. \
                  Optional filters: bedrooms, bathrooms, propertyType. limit defaults to 15 (max 50). \
                  Returns a JSON list of property objects.",
    params: &[
        CITY,
        STATE,
        ZIP_CODE,
        BEDROOMS,
        BATHROOMS,
        PROPERTY_TYPE,
        limit(15),
    ],
    rule: ArgumentRule::Location,
};

static GET_RANDOM_PROPERTIES: ToolSpec = ToolSpec {
    tool: ToolName::GetRandomProperties,
    description: "Retrieve a random sample of property records for market analysis. \
                  Optional filters: city, state, zipCode. limit defaults to 10 (max 50). \
                  Returns a JSON list of property objects.",
    params: &[CITY, STATE, ZIP_CODE, limit(10)],
    rule: ArgumentRule::None,
};

static ANALYZE_MARKET: ToolSpec = ToolSpec {
    tool: ToolName::AnalyzeMarket,
    description: "Get market statistics and trends for a location. Filters: zipCode, city, state. \
                  dataType selects All, Sale or Rental statistics (default All). \
                  Returns a JSON list of market statistics objects.",
    params: &[
        ZIP_CODE,
        CITY,
        STATE,
        ParamSpec::one_of(
            "dataType",
            DATA_TYPES,
            "Statistics to include: All, Sale or Rental",
        )
        .alias("data_type")
        .default_value(Literal::Text("All")),
    ],
    rule: ArgumentRule::None,
};

static GET_PROPERTY_VALUE: ToolSpec = ToolSpec {
    tool: ToolName::GetPropertyValue,
    description: "Get an automated property value estimate (AVM) with comparable properties. \
                  Requires one of propertyId, address, or latitude and longitude. \
                  Optional: propertyType, bedrooms, bathrooms, squareFootage. \
                  Returns a JSON object with the estimate, its range and comparables.",
    params: &[
        PROPERTY_ID,
        ADDRESS,
        LATITUDE,
        LONGITUDE,
        PROPERTY_TYPE,
        BEDROOMS,
        BATHROOMS,
        SQUARE_FOOTAGE,
    ],
    rule: ArgumentRule::PropertyIdentifier,
};

static GET_RENT_ESTIMATES: ToolSpec = ToolSpec {
    tool: ToolName::GetRentEstimates,
    description: "Get a long-term rent estimate with comparable rentals. \
                  Requires one of propertyId, address, or latitude and longitude. \
                  Optional: propertyType, bedrooms, bathrooms, squareFootage. \
                  Returns a JSON object with the estimated rent, its range and comparables.",
    params: &[
        PROPERTY_ID,
        ADDRESS,
        LATITUDE,
        LONGITUDE,
        PROPERTY_TYPE,
        BEDROOMS,
        BATHROOMS,
        SQUARE_FOOTAGE,
    ],
    rule: ArgumentRule::PropertyIdentifier,
};

static GET_SALE_LISTINGS: ToolSpec = ToolSpec {
    tool: ToolName::GetSaleListings,
    description: "Retrieve properties listed for sale. Requires at least one of city, state or zipCode. \
                  Optional: status (Active or Inactive), limit (default 15, max 50). \
                  Returns a JSON list of sale listing objects.",
    params: &[CITY, STATE, ZIP_CODE, LISTING_STATUS, limit(15)],
    rule: ArgumentRule::Location,
};

static GET_RENTAL_LISTINGS: ToolSpec = ToolSpec {
    tool: ToolName::GetRentalListings,
    description: "Retrieve long-term rental listings. Requires at least one of city, state or zipCode. \
                  Optional: status (Active or Inactive), limit (default 15, max 50). \
                  Returns a JSON list of rental listing objects.",
    params: &[CITY, STATE, ZIP_CODE, LISTING_STATUS, limit(15)],
    rule: ArgumentRule::Location,
};

static GET_PROPERTY_DETAILS: ToolSpec = ToolSpec {
    tool: ToolName::GetPropertyDetails,
    description: "Get detailed information for one property by id. \
                  Set listingType to sale or rental to fetch the matching listing record instead. \
                  Returns a JSON object.",
    params: &[
        ParamSpec::string("id", "Property or listing identifier")
            .alias("property_id")
            .required()
            .path_segment(),
        ParamSpec::one_of(
            "listingType",
            LISTING_TYPES,
            "Fetch the sale or rental listing with this id instead of the property record",
        )
        .alias("listing_type"),
    ],
    rule: ArgumentRule::None,
};
