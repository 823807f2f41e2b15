use crate::error::{RegistryError, ValidationError};
use crate::types::ParamValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder substituted by [`EndpointRegistry::resolve_path`].
pub const ID_PLACEHOLDER: &str = "{id}";

/// Name of the argument that fills [`ID_PLACEHOLDER`].
pub const ID_PARAM: &str = "id";

/// `.` and `..` would be collapsed by URL path normalization.
pub fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
}

/// Shape of the payload an endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    PropertyList,
    Property,
    Markets,
    Valuation,
    RentEstimate,
    SaleListings,
    SaleListing,
    RentalListings,
    RentalListing,
}

/// One provider endpoint. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    pub logical_name: &'static str,
    pub path_template: &'static str,
    pub method: HttpMethod,
    pub required_params: &'static [&'static str],
    pub optional_params: &'static [&'static str],
    pub default_overrides: Vec<(&'static str, ParamValue)>,
    pub shape: ResponseShape,
}

/// A piece of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Literal(&'static str),
    Placeholder,
}

impl EndpointDescriptor {
    pub fn has_path_param(&self) -> bool {
        self.path_template.contains(ID_PLACEHOLDER)
    }

    /// Whether `name` may be sent to this endpoint as a query parameter.
    pub fn accepts_query_param(&self, name: &str) -> bool {
        if self.has_path_param() && name == ID_PARAM {
            return false;
        }
        self.required_params.contains(&name) || self.optional_params.contains(&name)
    }

    pub fn path_segments(&self) -> impl Iterator<Item = PathSegment> {
        self.path_template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == ID_PLACEHOLDER {
                    PathSegment::Placeholder
                } else {
                    PathSegment::Literal(s)
                }
            })
    }
}

const LOCATION: &[&str] = &["city", "state", "zipCode"];
const PROPERTY_SEARCH: &[&str] = &[
    "city",
    "state",
    "zipCode",
    "bedrooms",
    "bathrooms",
    "propertyType",
    "limit",
];
const RANDOM_PROPERTIES: &[&str] = &["city", "state", "zipCode", "limit"];
const MARKET: &[&str] = &["zipCode", "city", "state", "dataType"];
const AVM: &[&str] = &[
    "propertyId",
    "address",
    "latitude",
    "longitude",
    "propertyType",
    "bedrooms",
    "bathrooms",
    "squareFootage",
];
const LISTING_SEARCH: &[&str] = &["city", "state", "zipCode", "status", "limit"];
const BY_ID: &[&str] = &[ID_PARAM];

/// Endpoint lookup table.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: HashMap<&'static str, EndpointDescriptor>,
}

impl EndpointRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            endpoints: HashMap::new(),
        }
    }

    /// The RentCast v1 endpoints served by this gateway.
    pub fn rentcast() -> Self {
        let mut registry = Self::new();

        registry.register(descriptor(
            "properties",
            "/properties",
            &[],
            PROPERTY_SEARCH,
            vec![],
            ResponseShape::PropertyList,
        ));
        registry.register(descriptor(
            "properties/random",
            "/properties/random",
            &[],
            RANDOM_PROPERTIES,
            vec![("limit", ParamValue::Integer(10))],
            ResponseShape::PropertyList,
        ));
        registry.register(descriptor(
            "properties/{id}",
            "/properties/{id}",
            BY_ID,
            &[],
            vec![],
            ResponseShape::Property,
        ));
        registry.register(descriptor(
            "markets",
            "/markets",
            &[],
            MARKET,
            vec![("dataType", ParamValue::from("All"))],
            ResponseShape::Markets,
        ));
        registry.register(descriptor(
            "avm/value",
            "/avm/value",
            &[],
            AVM,
            vec![],
            ResponseShape::Valuation,
        ));
        registry.register(descriptor(
            "avm/rent/long-term",
            "/avm/rent/long-term",
            &[],
            AVM,
            vec![],
            ResponseShape::RentEstimate,
        ));
        registry.register(descriptor(
            "listings/sale",
            "/listings/sale",
            &[],
            LISTING_SEARCH,
            vec![("limit", ParamValue::Integer(15))],
            ResponseShape::SaleListings,
        ));
        registry.register(descriptor(
            "listings/sale/{id}",
            "/listings/sale/{id}",
            BY_ID,
            &[],
            vec![],
            ResponseShape::SaleListing,
        ));
        registry.register(descriptor(
            "listings/rental/long-term",
            "/listings/rental/long-term",
            &[],
            LISTING_SEARCH,
            vec![("limit", ParamValue::Integer(15))],
            ResponseShape::RentalListings,
        ));
        registry.register(descriptor(
            "listings/rental/long-term/{id}",
            "/listings/rental/long-term/{id}",
            BY_ID,
            &[],
            vec![],
            ResponseShape::RentalListing,
        ));

        registry
    }

    pub fn register(&mut self, descriptor: EndpointDescriptor) {
        self.endpoints.insert(descriptor.logical_name, descriptor);
    }

    pub fn lookup(&self, logical_name: &str) -> Result<&EndpointDescriptor, RegistryError> {
        self.endpoints
            .get(logical_name)
            .ok_or_else(|| RegistryError::UnknownEndpoint(logical_name.to_string()))
    }

    /// Substitute the `{id}` placeholder. Templates without one come back
    /// unchanged and ignore `path_param`.
    pub fn resolve_path(
        descriptor: &EndpointDescriptor,
        path_param: Option<&str>,
    ) -> Result<String, ValidationError> {
        if !descriptor.has_path_param() {
            return Ok(descriptor.path_template.to_string());
        }

        match path_param {
            Some(id) if is_dot_segment(id) => Err(ValidationError::InvalidPathSegment {
                field: ID_PARAM.to_string(),
                got: id.to_string(),
            }),
            Some(id) if !id.is_empty() => Ok(descriptor.path_template.replacen(ID_PLACEHOLDER, id, 1)),
            _ => Err(ValidationError::MissingPathParameter {
                endpoint: descriptor.logical_name.to_string(),
                param: ID_PARAM.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.endpoints.keys().copied()
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::rentcast()
    }
}

fn descriptor(
    logical_name: &'static str,
    path_template: &'static str,
    required_params: &'static [&'static str],
    optional_params: &'static [&'static str],
    default_overrides: Vec<(&'static str, ParamValue)>,
    shape: ResponseShape,
) -> EndpointDescriptor {
    EndpointDescriptor {
        logical_name,
        path_template,
        method: HttpMethod::Get,
        required_params,
        optional_params,
        default_overrides,
        shape,
    }
}

/// Location parameters shared by the search endpoints.
pub fn location_params() -> &'static [&'static str] {
    LOCATION
}
