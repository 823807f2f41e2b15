// MCP (Model Context Protocol) server exposing the RentCast API as tools.

pub mod dispatcher;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatcher::{Dispatcher, ToolOutcome};
pub use server::McpServer;
pub use tools::{GatewayTool, Tool, ToolRegistry};
