mod registry;
pub mod rentcast;

pub use registry::{
    json_schema_enum, json_schema_integer, json_schema_number, json_schema_object,
    json_schema_string, Tool, ToolRegistry,
};
pub use rentcast::{input_schema, GatewayTool};
