//! Translation of the flat options record into the chat client's parameter bags.
//!
//! Three outputs are produced, all pure functions of their inputs:
//!
//! * [`DirectFields`]: fields the client constructor declares itself.
//! * [`ExtraParameters`]: provider features the typed surface does not model,
//!   flattened into the request body as-is.
//! * [`HostedTool`] descriptors for the Responses API built-in tools.

#[path = "mapper/json.rs"]
mod json;

#[path = "mapper/direct.rs"]
mod direct;

#[path = "mapper/extra.rs"]
mod extra;

#[path = "mapper/tools.rs"]
mod tools;

pub use direct::{build_direct_fields, DirectFields};
pub use extra::{build_extra_parameters, ExtraParameters};
pub(crate) use json::{parse_embedded, parse_embedded_object};
pub use tools::{
    format_builtin_tools, parse_allowed_domains, HostedTool, UserLocation, WebSearchFilters,
    MAX_FILE_SEARCH_RESULTS,
};
