use crate::endpoints::ResponseShape;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Property record from `/properties`, `/properties/random` and `/properties/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sale or long-term rental listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_on_market: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Market statistics for a ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// AVM property value estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range_low: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range_high: Option<Number>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comparables: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// AVM long-term rent estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_range_low: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_range_high: Option<Number>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comparables: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Provider payload tagged by the endpoint shape that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum ProviderData {
    Properties(Vec<PropertyRecord>),
    Property(Option<PropertyRecord>),
    Markets(Vec<MarketStatistics>),
    Valuation(Option<ValueEstimate>),
    RentEstimate(Option<RentEstimate>),
    SaleListings(Vec<Listing>),
    SaleListing(Option<Listing>),
    RentalListings(Vec<Listing>),
    RentalListing(Option<Listing>),
}

impl ProviderData {
    /// Decode a successful response body for the given shape.
    ///
    /// Collections may arrive as a bare array, as an object holding the array
    /// under a well-known key (`properties`, `listings`, `markets`), or as a
    /// single object. Single records may arrive bare or nested under their key.
    pub fn decode(shape: ResponseShape, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match shape {
            ResponseShape::PropertyList => Self::Properties(decode_many(value, "properties")?),
            ResponseShape::Property => Self::Property(decode_one(value, "property")?),
            ResponseShape::Markets => Self::Markets(decode_many(value, "markets")?),
            ResponseShape::Valuation => Self::Valuation(decode_one(value, "avm")?),
            ResponseShape::RentEstimate => Self::RentEstimate(decode_one(value, "avm")?),
            ResponseShape::SaleListings => Self::SaleListings(decode_many(value, "listings")?),
            ResponseShape::SaleListing => Self::SaleListing(decode_one(value, "listing")?),
            ResponseShape::RentalListings => Self::RentalListings(decode_many(value, "listings")?),
            ResponseShape::RentalListing => Self::RentalListing(decode_one(value, "listing")?),
        })
    }

    pub fn shape(&self) -> ResponseShape {
        match self {
            Self::Properties(_) => ResponseShape::PropertyList,
            Self::Property(_) => ResponseShape::Property,
            Self::Markets(_) => ResponseShape::Markets,
            Self::Valuation(_) => ResponseShape::Valuation,
            Self::RentEstimate(_) => ResponseShape::RentEstimate,
            Self::SaleListings(_) => ResponseShape::SaleListings,
            Self::SaleListing(_) => ResponseShape::SaleListing,
            Self::RentalListings(_) => ResponseShape::RentalListings,
            Self::RentalListing(_) => ResponseShape::RentalListing,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Properties(v) => v.len(),
            Self::Markets(v) => v.len(),
            Self::SaleListings(v) | Self::RentalListings(v) => v.len(),
            Self::Property(r) => usize::from(r.is_some()),
            Self::Valuation(r) => usize::from(r.is_some()),
            Self::RentEstimate(r) => usize::from(r.is_some()),
            Self::SaleListing(r) | Self::RentalListing(r) => usize::from(r.is_some()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text shown to the client when nothing came back.
    pub fn empty_message(shape: ResponseShape) -> &'static str {
        match shape {
            ResponseShape::PropertyList => "No properties found matching the criteria.",
            ResponseShape::Property => "No property details found for the specified property ID.",
            ResponseShape::Markets => "No market data found for the specified location.",
            ResponseShape::Valuation => "No property value data found for the specified property.",
            ResponseShape::RentEstimate => "No rent estimate data found for the specified property.",
            ResponseShape::SaleListings => "No sale listings found matching the criteria.",
            ResponseShape::SaleListing => "No sale listing found for the specified ID.",
            ResponseShape::RentalListings => "No rental listings found matching the criteria.",
            ResponseShape::RentalListing => "No rental listing found for the specified ID.",
        }
    }
}

fn decode_many<T: serde::de::DeserializeOwned>(
    value: Value,
    key: &str,
) -> Result<Vec<T>, serde_json::Error> {
    let items = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            Some(other) => vec![other],
            None if map.is_empty() => Vec::new(),
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    };

    items.into_iter().map(serde_json::from_value).collect()
}

fn decode_one<T: serde::de::DeserializeOwned>(
    value: Value,
    key: &str,
) -> Result<Option<T>, serde_json::Error> {
    let record = match value {
        Value::Null => return Ok(None),
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        },
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Null) => return Ok(None),
            Some(nested) => nested,
            None if map.is_empty() => return Ok(None),
            None => Value::Object(map),
        },
        other => other,
    };

    serde_json::from_value(record).map(Some)
}
