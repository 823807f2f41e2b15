// Tool dispatch: validate, admit, call the provider, shape the answer.

use crate::protocol::CallToolResult;
use rentcast_core::{
    ApiCallResult, GatewayError, ProviderData, QuotaGuard, QuotaSnapshot, ResponseShape, ToolName,
};
use rentcast_sdk::RentcastClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Stopped before the provider was contacted.
    Rejected(GatewayError),
    /// The provider was called; `result` says how that went.
    Completed {
        shape: ResponseShape,
        result: ApiCallResult,
    },
}

impl ToolOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Render for an MCP client.
    pub fn into_call_result(self) -> CallToolResult {
        match self {
            Self::Rejected(error) => {
                let body = json!({
                    "category": error.category(),
                    "kind": error.kind(),
                    "message": error.to_string(),
                    "retryable": error.is_retryable(),
                });
                CallToolResult::error(pretty(&body))
            }
            Self::Completed { result, .. } if !result.success => {
                let body = serde_json::to_value(&result).unwrap_or_else(|_| {
                    json!({"success": false, "error": result.error, "endpoint": result.endpoint})
                });
                CallToolResult::error(pretty(&body))
            }
            Self::Completed { shape, result } => {
                render_records(shape, result.data.unwrap_or(Value::Null))
            }
        }
    }
}

fn render_records(shape: ResponseShape, data: Value) -> CallToolResult {
    let empty = match ProviderData::decode(shape, data.clone()) {
        Ok(records) => records.is_empty(),
        Err(e) => {
            debug!(shape = ?shape, error = %e, "Payload did not match the expected shape");
            false
        }
    };

    if empty {
        CallToolResult::text(ProviderData::empty_message(shape))
    } else {
        CallToolResult::text(pretty(&data))
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Routes every tool through validation, the quota guard and the provider
/// client, in that order.
pub struct Dispatcher {
    client: RentcastClient,
    quota: Arc<QuotaGuard>,
}

impl Dispatcher {
    pub fn new(client: RentcastClient, quota: Arc<QuotaGuard>) -> Self {
        Self { client, quota }
    }

    pub fn quota(&self) -> QuotaSnapshot {
        self.quota.snapshot()
    }

    /// Run `tool` with raw client arguments.
    ///
    /// Rejected calls never touch the network or the quota counters.
    pub async fn dispatch(&self, tool: ToolName, raw_args: &Value) -> ToolOutcome {
        let args = match tool.spec().validate(raw_args) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %tool, kind = e.kind(), error = %e, "Rejected tool arguments");
                return ToolOutcome::Rejected(e.into());
            }
        };

        let endpoint = tool.endpoint(&args);
        let shape = match self.client.registry().lookup(endpoint) {
            Ok(descriptor) => descriptor.shape,
            Err(e) => {
                warn!(tool = %tool, endpoint, error = %e, "Tool routed to unknown endpoint");
                return ToolOutcome::Rejected(e.into());
            }
        };

        let admission = match self.quota.admit() {
            Ok(admission) => admission,
            Err(e) => {
                warn!(tool = %tool, kind = e.kind(), error = %e, "Quota refused tool call");
                return ToolOutcome::Rejected(e.into());
            }
        };

        debug!(
            tool = %tool,
            endpoint,
            session_calls = admission.session_calls,
            session_remaining = admission.session_remaining,
            "Dispatching tool call"
        );

        let result = self.client.invoke(endpoint, &args).await;
        info!(
            tool = %tool,
            endpoint = %result.endpoint,
            success = result.success,
            session_calls = admission.session_calls,
            "Tool call completed"
        );

        ToolOutcome::Completed { shape, result }
    }

    /// Search property records by location and filters.
    pub async fn search_properties(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::SearchProperties, args).await
    }

    pub async fn get_random_properties(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::GetRandomProperties, args).await
    }

    /// Market statistics for a ZIP code or city.
    pub async fn analyze_market(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::AnalyzeMarket, args).await
    }

    /// AVM value estimate with comparables.
    pub async fn get_property_value(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::GetPropertyValue, args).await
    }

    /// AVM long-term rent estimate with comparables.
    pub async fn get_rent_estimates(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::GetRentEstimates, args).await
    }

    pub async fn get_sale_listings(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::GetSaleListings, args).await
    }

    pub async fn get_rental_listings(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::GetRentalListings, args).await
    }

    /// One property record, or one listing when `listingType` is given.
    pub async fn get_property_details(&self, args: &Value) -> ToolOutcome {
        self.dispatch(ToolName::GetPropertyDetails, args).await
    }
}
