use serde::Serialize;
use serde_json::Value;

use crate::error::LLMError;
use crate::options::{non_empty, BuiltInTools, FileSearchOptions, SearchContextSize, WebSearchOptions};

use super::json::parse_embedded;

pub const MAX_FILE_SEARCH_RESULTS: u32 = 50;

/// OpenAI-hosted tool descriptor for the Responses API.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostedTool {
    WebSearch {
        search_context_size: SearchContextSize,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_location: Option<UserLocation>,
        #[serde(skip_serializing_if = "Option::is_none")]
        filters: Option<WebSearchFilters>,
    },
    FileSearch {
        vector_store_ids: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        filters: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_num_results: Option<u32>,
    },
    CodeInterpreter,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserLocation {
    #[serde(rename = "type")]
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WebSearchFilters {
    pub allowed_domains: Vec<String>,
}

/// Converts the built-in tool selection into hosted tool descriptors.
///
/// Order is fixed: web search, file search, code interpreter.
pub fn format_builtin_tools(tools: &BuiltInTools) -> Result<Vec<HostedTool>, LLMError> {
    let mut hosted = Vec::new();
    if let Some(web) = &tools.web_search {
        hosted.push(web_search_tool(web));
    }
    if let Some(files) = &tools.file_search {
        hosted.push(file_search_tool(files)?);
    }
    if tools.code_interpreter {
        hosted.push(HostedTool::CodeInterpreter);
    }
    Ok(hosted)
}

/// Splits a comma-separated domain list, dropping blank segments.
pub fn parse_allowed_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
        .collect()
}

fn web_search_tool(options: &WebSearchOptions) -> HostedTool {
    let city = non_empty(&options.city).map(str::to_string);
    let region = non_empty(&options.region).map(str::to_string);
    let country = non_empty(&options.country).map(str::to_string);
    let user_location = if city.is_some() || region.is_some() || country.is_some() {
        Some(UserLocation {
            location_type: "approximate".to_string(),
            city,
            region,
            country,
        })
    } else {
        None
    };
    let filters = options
        .allowed_domains
        .as_deref()
        .map(parse_allowed_domains)
        .filter(|domains| !domains.is_empty())
        .map(|allowed_domains| WebSearchFilters { allowed_domains });

    HostedTool::WebSearch {
        search_context_size: options.search_context_size,
        user_location,
        filters,
    }
}

fn file_search_tool(options: &FileSearchOptions) -> Result<HostedTool, LLMError> {
    let vector_store_ids = match parse_embedded("vectorStoreIds", options.vector_store_ids.as_ref())? {
        None => Vec::new(),
        Some(value) => serde_json::from_value(value).map_err(|e| LLMError::InvalidJson {
            field: "vectorStoreIds".to_string(),
            message: format!("expected an array of strings: {e}"),
        })?,
    };
    let filters = match parse_embedded("filters", options.filters.as_ref())? {
        Some(Value::Object(map)) => Some(Value::Object(map)),
        Some(other) => {
            return Err(LLMError::InvalidJson {
                field: "filters".to_string(),
                message: format!("expected a JSON object, got {other}"),
            })
        }
        None => None,
    };
    let max_num_results = options
        .max_results
        .map(|max| max.clamp(1, MAX_FILE_SEARCH_RESULTS));

    Ok(HostedTool::FileSearch {
        vector_store_ids,
        filters,
        max_num_results,
    })
}
