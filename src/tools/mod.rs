pub mod serper;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::llm::types::{ChatMessage, ChatRequest, ToolCall, ToolSpec};
use crate::state::AppState;

/// The fixed tool registry. Dispatch is keyed on this enum, not on raw
/// strings from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    GetTickers,
    SearchPlaces,
    GoShopping,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetTickers => "getTickers",
            ToolName::SearchPlaces => "searchPlaces",
            ToolName::GoShopping => "goShopping",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "getTickers" => Some(ToolName::GetTickers),
            "searchPlaces" => Some(ToolName::SearchPlaces),
            "goShopping" => Some(ToolName::GoShopping),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TickerArgs {
    /// The stock ticker symbol and market name, example NYSE:K or NASDAQ:AAPL
    pub ticker: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlacesArgs {
    /// The search query for places
    pub query: String,
    /// The location to search for places
    pub location: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShoppingArgs {
    /// The search query for shopping items
    pub query: String,
}

pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: ToolName::GetTickers.as_str().to_string(),
            description: "Get a single market name and stock ticker if the user mentions a \
                          public company"
                .to_string(),
            parameters: schema_value(schemars::schema_for!(TickerArgs)),
        },
        ToolSpec {
            name: ToolName::SearchPlaces.as_str().to_string(),
            description: "ONLY SEARCH for places using the given query and location".to_string(),
            parameters: schema_value(schemars::schema_for!(PlacesArgs)),
        },
        ToolSpec {
            name: ToolName::GoShopping.as_str().to_string(),
            description: "Search for shopping items using the given query".to_string(),
            parameters: schema_value(schemars::schema_for!(ShoppingArgs)),
        },
    ]
}

fn schema_value(schema: schemars::Schema) -> Value {
    serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Asks the model to pick zero-or-one tool for the query and invokes it.
///
/// The return value is always a parseable JSON payload: the selected
/// tool's result, or `{"error": …}` when no tool was selected, argument
/// parsing failed, or the handler failed. Callers discriminate on the
/// `type`/`error` field.
pub async fn route_function_call(state: &AppState, query: &str) -> Value {
    match try_route(state, query).await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!("Function calling failed: {}", err);
            json!({ "error": "An error occurred during function calling" })
        }
    }
}

async fn try_route(state: &AppState, query: &str) -> Result<Value, ApiError> {
    let system_message = state.composer.system_message(query, false).await?;

    let mut request = ChatRequest::new(vec![
        ChatMessage::system(system_message),
        ChatMessage::user(query),
    ]);
    request.max_tokens = Some(4096);

    let outcome = state
        .llm
        .chat_with_tools(request, &tool_specs(), &state.settings.chat_model)
        .await?;

    let Some(call) = outcome.tool_calls.into_iter().next() else {
        return Ok(json!({ "error": "No function call was triggered" }));
    };

    Ok(dispatch(state, &call).await)
}

async fn dispatch(state: &AppState, call: &ToolCall) -> Value {
    let Some(name) = ToolName::parse(&call.name) else {
        tracing::warn!("Model selected unknown function: {}", call.name);
        return json!({ "error": format!("Unknown function {}", call.name) });
    };

    let result = invoke(state, name, &call.arguments).await;
    match result {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!("Error calling function {}: {}", name.as_str(), err);
            json!({ "error": format!("Failed to call function {}", name.as_str()) })
        }
    }
}

async fn invoke(state: &AppState, name: ToolName, arguments: &str) -> Result<Value, ApiError> {
    let settings = &state.settings;
    match name {
        ToolName::GetTickers => {
            let args: TickerArgs = parse_args(arguments)?;
            Ok(json!({ "type": "ticker", "data": args.ticker }))
        }
        ToolName::SearchPlaces => {
            let args: PlacesArgs = parse_args(arguments)?;
            serper::search_places(
                &state.http,
                &settings.serper_base_url,
                &settings.serper_api_key,
                &args.query,
                &args.location,
            )
            .await
        }
        ToolName::GoShopping => {
            let args: ShoppingArgs = parse_args(arguments)?;
            serper::go_shopping(
                &state.http,
                &settings.serper_base_url,
                &settings.serper_api_key,
                &args.query,
            )
            .await
        }
    }
}

fn parse_args<'a, T: Deserialize<'a>>(arguments: &'a str) -> Result<T, ApiError> {
    serde_json::from_str(arguments)
        .map_err(|err| ApiError::BadRequest(format!("invalid tool arguments: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_round_trip() {
        for name in [
            ToolName::GetTickers,
            ToolName::SearchPlaces,
            ToolName::GoShopping,
        ] {
            assert_eq!(ToolName::parse(name.as_str()), Some(name));
        }
        assert_eq!(ToolName::parse("somethingElse"), None);
    }

    #[test]
    fn registry_exposes_all_three_tools_with_schemas() {
        let specs = tool_specs();
        assert_eq!(specs.len(), 3);
        for spec in &specs {
            assert!(ToolName::parse(&spec.name).is_some());
            assert!(spec.parameters.is_object());
        }
    }

    #[test]
    fn ticker_arguments_parse_from_model_json() {
        let args: TickerArgs = parse_args(r#"{"ticker": "NASDAQ:AAPL"}"#).expect("should parse");
        assert_eq!(args.ticker, "NASDAQ:AAPL");
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        let result: Result<PlacesArgs, _> = parse_args("not json");
        assert!(result.is_err());
    }
}
