//! Canned MCP servers used while the real integrations are unavailable.

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct StubTool {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema of the tool arguments
    pub input_schema: Value,
    #[serde(skip)]
    pub result: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct StubServer {
    pub name: &'static str,
    pub description: &'static str,
    pub tools: Vec<StubTool>,
}

impl StubServer {
    pub fn tool(&self, name: &str) -> Option<&StubTool> {
        self.tools.iter().find(|tool| tool.name == name)
    }
}

lazy_static::lazy_static! {
    static ref CATALOG: Vec<StubServer> = build_catalog();
}

pub fn servers() -> &'static [StubServer] {
    &CATALOG
}

pub fn server(name: &str) -> Option<&'static StubServer> {
    CATALOG.iter().find(|server| server.name == name)
}

fn build_catalog() -> Vec<StubServer> {
    vec![
        StubServer {
            name: "crm",
            description: "Customer relationship lookups",
            tools: vec![
                StubTool {
                    name: "lookup_customer",
                    description: "Find a customer by name or email",
                    input_schema: json!({
                        "type": "object",
                        "properties": {"query": {"type": "string"}},
                        "required": ["query"]
                    }),
                    result: json!({
                        "customers": [{
                            "name": "Sample Homeowner",
                            "email": "homeowner@example.com",
                            "open_jobs": 1
                        }]
                    }),
                },
                StubTool {
                    name: "list_open_jobs",
                    description: "Jobs that are not completed or cancelled",
                    input_schema: json!({"type": "object", "properties": {}}),
                    result: json!({
                        "jobs": [{
                            "job_number": "JOB-20240101-STUB01",
                            "title": "Tear-off and re-roof",
                            "status": "scheduled"
                        }]
                    }),
                },
            ],
        },
        StubServer {
            name: "weather",
            description: "Jobsite weather forecasts",
            tools: vec![StubTool {
                name: "forecast",
                description: "Three-day forecast for a postal code",
                input_schema: json!({
                    "type": "object",
                    "properties": {"zip": {"type": "string"}},
                    "required": ["zip"]
                }),
                result: json!({
                    "days": [
                        {"day": 0, "condition": "clear", "wind_mph": 6, "precip_chance": 0.05},
                        {"day": 1, "condition": "cloudy", "wind_mph": 12, "precip_chance": 0.2},
                        {"day": 2, "condition": "rain", "wind_mph": 18, "precip_chance": 0.8}
                    ],
                    "safe_to_work": [true, true, false]
                }),
            }],
        },
        StubServer {
            name: "documents",
            description: "Manufacturer specs and internal documents",
            tools: vec![StubTool {
                name: "search_documents",
                description: "Full-text search over indexed documents",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "limit": {"type": "integer", "minimum": 1, "maximum": 20}
                    },
                    "required": ["query"]
                }),
                result: json!({
                    "results": [{
                        "path": "specs/shingle-installation.md",
                        "snippet": "Use six nails per shingle in high-wind zones."
                    }]
                }),
            }],
        },
    ]
}
