// RentCast tools backed by the dispatcher

use crate::dispatcher::Dispatcher;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_enum, json_schema_integer, json_schema_number, json_schema_object,
    json_schema_string, Tool, ToolRegistry,
};
use anyhow::Result;
use rentcast_core::schema::{Bounds, Overflow, ParamKind, ParamSpec};
use rentcast_core::{ToolName, ToolSpec};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One RentCast tool. All eight share the dispatcher and its quota.
pub struct GatewayTool {
    tool: ToolName,
    dispatcher: Arc<Dispatcher>,
}

impl GatewayTool {
    pub fn new(tool: ToolName, dispatcher: Arc<Dispatcher>) -> Self {
        Self { tool, dispatcher }
    }
}

#[async_trait::async_trait]
impl Tool for GatewayTool {
    fn schema(&self) -> ToolSchema {
        let spec = self.tool.spec();
        ToolSchema {
            name: self.tool.as_str().to_string(),
            description: spec.description.to_string(),
            input_schema: input_schema(spec),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        Ok(self
            .dispatcher
            .dispatch(self.tool, &arguments)
            .await
            .into_call_result())
    }
}

impl ToolRegistry {
    /// Registry holding every RentCast tool.
    pub fn with_gateway(dispatcher: Arc<Dispatcher>) -> Self {
        let mut registry = Self::new();
        for tool in ToolName::ALL {
            registry.register(Arc::new(GatewayTool::new(tool, dispatcher.clone())));
        }
        registry
    }
}

/// JSON Schema for a tool's arguments, derived from its parameter table.
pub fn input_schema(spec: &ToolSpec) -> Value {
    let mut properties = Map::new();
    for param in spec.params {
        properties.insert(param.name.to_string(), param_schema(param));
    }

    let required = spec
        .params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name)
        .collect();

    json_schema_object(Value::Object(properties), required)
}

fn param_schema(param: &ParamSpec) -> Value {
    let mut schema = match param.kind {
        ParamKind::String => json_schema_string(param.description),
        ParamKind::Integer => json_schema_integer(param.description),
        ParamKind::Decimal => json_schema_number(param.description),
        ParamKind::Enum(allowed) => json_schema_enum(allowed, param.description),
    };

    if let Value::Object(map) = &mut schema {
        if let Some(Bounds { min, max, overflow }) = param.bounds {
            map.insert("minimum".to_string(), bound(param.kind, min));
            // Clamped values are accepted above the cap.
            if overflow == Overflow::Reject {
                map.insert("maximum".to_string(), bound(param.kind, max));
            }
        }
        if let Some(default) = param.default {
            map.insert("default".to_string(), default.to_json());
        }
    }

    schema
}

fn bound(kind: ParamKind, value: f64) -> Value {
    match kind {
        ParamKind::Integer => Value::from(value as i64),
        _ => Value::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_properties_schema() {
        let schema = input_schema(ToolName::SearchProperties.spec());

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], serde_json::json!([]));
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["properties"]["limit"]["default"], 15);
        assert_eq!(schema["properties"]["limit"]["minimum"], 1);
        assert!(schema["properties"]["limit"].get("maximum").is_none());
        assert_eq!(schema["properties"]["bedrooms"]["maximum"], 10);
        assert_eq!(schema["properties"]["bathrooms"]["type"], "number");
    }

    #[test]
    fn test_property_details_schema() {
        let schema = input_schema(ToolName::GetPropertyDetails.spec());

        assert_eq!(schema["required"], serde_json::json!(["id"]));
        assert_eq!(
            schema["properties"]["listingType"]["enum"],
            serde_json::json!(["sale", "rental"])
        );
    }

    #[test]
    fn test_market_schema_enum_and_default() {
        let schema = input_schema(ToolName::AnalyzeMarket.spec());
        let data_type = &schema["properties"]["dataType"];

        assert_eq!(data_type["enum"], serde_json::json!(["All", "Sale", "Rental"]));
        assert_eq!(data_type["default"], "All");
    }
}
