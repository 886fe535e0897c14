//! Typed memory operations and their translation to service requests.
//!
//! Untyped command arguments are validated once, in
//! [`MemoryOperation::from_args`], before any I/O happens. A missing required
//! argument is reported with the message callers see verbatim. `create` and
//! `search` have no required arguments; absent text defaults to empty.
//!
//! | Operation      | Request                        |
//! |----------------|--------------------------------|
//! | `create`       | `POST /memory`                 |
//! | `search`       | `POST /memory/search`          |
//! | `update`       | `PUT /memory/{id}`             |
//! | `delete`       | `DELETE /memory/{id}`          |
//! | `list`         | `GET /memory?…`                |
//! | `stats`        | `GET /memory/admin/stats`      |
//! | `topics`       | `GET /topics`                  |
//! | `create-topic` | `POST /topics`                 |
//! | `api`          | any method, caller-chosen path |
//! | `health`       | `GET /health`                  |

use mnemo_core::resolver::extract::derive_title;
use mnemo_core::CommandArgs;
use serde_json::{json, Map, Value};

use crate::error::{MemoryError, Result};
use crate::request::{encode_segment, ApiRequest, HttpMethod};

pub const DEFAULT_SEARCH_LIMIT: u64 = 10;
pub const DEFAULT_SEARCH_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MEMORY_TYPE: &str = "context";
pub const UNTITLED: &str = "Untitled";

pub const MSG_ID_REQUIRED: &str = "Memory ID required";
pub const MSG_TOPIC_REQUIRED: &str = "Topic name required";
pub const MSG_PATH_REQUIRED: &str = "API path required";

/// One validated call against the memory service.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryOperation {
    Create {
        title: String,
        content: String,
        memory_type: String,
        tags: Vec<String>,
        metadata: Option<Value>,
    },
    Search {
        query: String,
        limit: u64,
        threshold: f64,
        memory_type: Option<String>,
        tags: Vec<String>,
    },
    Update {
        id: String,
        title: Option<String>,
        content: Option<String>,
        memory_type: Option<String>,
        tags: Option<Vec<String>>,
    },
    Delete {
        id: String,
    },
    List {
        limit: Option<u64>,
        offset: Option<u64>,
        memory_type: Option<String>,
        tags: Vec<String>,
    },
    Stats,
    ListTopics,
    CreateTopic {
        name: String,
        description: Option<String>,
    },
    Api {
        method: HttpMethod,
        path: String,
        query: Vec<(String, String)>,
        body: Option<Value>,
    },
    Health,
}

impl MemoryOperation {
    /// Build an operation from an action name and its untyped arguments.
    ///
    /// Accepts both resolver action names (`list-topics`) and agent operation
    /// names (`topics`).
    pub fn from_args(action: &str, args: &CommandArgs) -> Result<Self> {
        match action {
            "create" => {
                let content = str_arg(args, "content").unwrap_or_default();
                let title = str_arg(args, "title")
                    .or_else(|| Some(derive_title(&content)).filter(|t| !t.is_empty()))
                    .unwrap_or_else(|| UNTITLED.to_string());
                Ok(Self::Create {
                    title,
                    content,
                    memory_type: memory_type_arg(args).unwrap_or_else(|| DEFAULT_MEMORY_TYPE.to_string()),
                    tags: tags_arg(args),
                    metadata: args.get("metadata").filter(|v| v.is_object()).cloned(),
                })
            }
            "search" => Ok(Self::Search {
                query: str_arg(args, "query").unwrap_or_default(),
                limit: u64_arg(args, "limit").unwrap_or(DEFAULT_SEARCH_LIMIT),
                threshold: args
                    .get("threshold")
                    .and_then(Value::as_f64)
                    .unwrap_or(DEFAULT_SEARCH_THRESHOLD),
                memory_type: memory_type_arg(args),
                tags: tags_arg(args),
            }),
            "update" => Ok(Self::Update {
                id: id_arg(args)?,
                title: str_arg(args, "title"),
                content: str_arg(args, "content"),
                memory_type: memory_type_arg(args),
                tags: args.get("tags").map(|_| tags_arg(args)),
            }),
            "delete" => Ok(Self::Delete { id: id_arg(args)? }),
            "list" => Ok(Self::List {
                limit: u64_arg(args, "limit"),
                offset: u64_arg(args, "offset"),
                memory_type: memory_type_arg(args),
                tags: tags_arg(args),
            }),
            "stats" => Ok(Self::Stats),
            "topics" | "list-topics" => Ok(Self::ListTopics),
            "create-topic" => Ok(Self::CreateTopic {
                name: str_arg(args, "name").ok_or_else(|| MemoryError::missing(MSG_TOPIC_REQUIRED))?,
                description: str_arg(args, "description"),
            }),
            "api" => {
                let path = str_arg(args, "path").ok_or_else(|| MemoryError::missing(MSG_PATH_REQUIRED))?;
                let method = match str_arg(args, "method") {
                    Some(m) => m.parse()?,
                    None => HttpMethod::Get,
                };
                let query = args
                    .get("query")
                    .and_then(Value::as_object)
                    .map(|q| q.iter().map(|(k, v)| (k.clone(), scalar_string(v))).collect())
                    .unwrap_or_default();
                Ok(Self::Api {
                    method,
                    path,
                    query,
                    body: args.get("body").filter(|b| !b.is_null()).cloned(),
                })
            }
            "health" => Ok(Self::Health),
            other => Err(MemoryError::invalid(format!("Unknown memory operation: {}", other))),
        }
    }

    /// Operation name as used in batch summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Search { .. } => "search",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::List { .. } => "list",
            Self::Stats => "stats",
            Self::ListTopics => "topics",
            Self::CreateTopic { .. } => "create-topic",
            Self::Api { .. } => "api",
            Self::Health => "health",
        }
    }

    pub fn is_health(&self) -> bool {
        matches!(self, Self::Health)
    }

    /// Translate into a service request (headers are added by the client).
    pub fn into_request(self) -> ApiRequest {
        match self {
            Self::Create {
                title,
                content,
                memory_type,
                tags,
                metadata,
            } => {
                let mut body = json!({
                    "title": title,
                    "content": content,
                    "memory_type": memory_type,
                    "tags": tags,
                });
                if let (Some(metadata), Some(obj)) = (metadata, body.as_object_mut()) {
                    obj.insert("metadata".into(), metadata);
                }
                ApiRequest::post("/memory", body)
            }
            Self::Search {
                query,
                limit,
                threshold,
                memory_type,
                tags,
            } => {
                let mut body = Map::new();
                body.insert("query".into(), json!(query));
                body.insert("limit".into(), json!(limit));
                body.insert("threshold".into(), json!(threshold));
                if let Some(memory_type) = memory_type {
                    body.insert("memory_type".into(), json!(memory_type));
                }
                if !tags.is_empty() {
                    body.insert("tags".into(), json!(tags));
                }
                ApiRequest::post("/memory/search", Value::Object(body))
            }
            Self::Update {
                id,
                title,
                content,
                memory_type,
                tags,
            } => {
                let mut body = Map::new();
                if let Some(title) = title {
                    body.insert("title".into(), json!(title));
                }
                if let Some(content) = content {
                    body.insert("content".into(), json!(content));
                }
                if let Some(memory_type) = memory_type {
                    body.insert("memory_type".into(), json!(memory_type));
                }
                if let Some(tags) = tags {
                    body.insert("tags".into(), json!(tags));
                }
                ApiRequest::new(HttpMethod::Put, format!("/memory/{}", encode_segment(&id)))
                    .with_body(Value::Object(body))
            }
            Self::Delete { id } => {
                ApiRequest::new(HttpMethod::Delete, format!("/memory/{}", encode_segment(&id)))
            }
            Self::List {
                limit,
                offset,
                memory_type,
                tags,
            } => {
                let mut request = ApiRequest::get("/memory");
                if let Some(limit) = limit {
                    request = request.with_query("limit", limit.to_string());
                }
                if let Some(offset) = offset {
                    request = request.with_query("offset", offset.to_string());
                }
                if let Some(memory_type) = memory_type {
                    request = request.with_query("memory_type", memory_type);
                }
                if !tags.is_empty() {
                    request = request.with_query("tags", tags.join(","));
                }
                request
            }
            Self::Stats => ApiRequest::get("/memory/admin/stats"),
            Self::ListTopics => ApiRequest::get("/topics"),
            Self::CreateTopic { name, description } => {
                let mut body = Map::new();
                body.insert("name".into(), json!(name));
                if let Some(description) = description {
                    body.insert("description".into(), json!(description));
                }
                ApiRequest::post("/topics", Value::Object(body))
            }
            Self::Api {
                method,
                path,
                query,
                body,
            } => {
                let mut request = ApiRequest::new(method, path);
                request.query = query;
                request.body = body;
                request
            }
            Self::Health => ApiRequest::get("/health"),
        }
    }
}

fn str_arg(args: &CommandArgs, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn id_arg(args: &CommandArgs) -> Result<String> {
    match args.get("id") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => str_arg(args, "id").ok_or_else(|| MemoryError::missing(MSG_ID_REQUIRED)),
    }
}

fn u64_arg(args: &CommandArgs, key: &str) -> Option<u64> {
    match args.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn memory_type_arg(args: &CommandArgs) -> Option<String> {
    str_arg(args, "memory_type").or_else(|| str_arg(args, "type"))
}

fn tags_arg(args: &CommandArgs) -> Vec<String> {
    match args.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(list)) => list
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> CommandArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_request() {
        let op = MemoryOperation::from_args(
            "create",
            &args(json!({"title": "Launch Plan", "content": "Ship v2 by Friday", "tags": ["work"]})),
        )
        .unwrap();
        let req = op.into_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/memory");
        assert_eq!(
            req.body,
            Some(json!({
                "title": "Launch Plan",
                "content": "Ship v2 by Friday",
                "memory_type": "context",
                "tags": ["work"],
            }))
        );
    }

    #[test]
    fn test_create_derives_title() {
        let op = MemoryOperation::from_args("create", &args(json!({"content": "call the dentist"}))).unwrap();
        match op {
            MemoryOperation::Create { title, .. } => assert_eq!(title, "call the dentist"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_without_args_uses_defaults() {
        let req = MemoryOperation::from_args("create", &CommandArgs::new())
            .unwrap()
            .into_request();
        assert_eq!(req.path, "/memory");
        assert_eq!(
            req.body,
            Some(json!({
                "title": "Untitled",
                "content": "",
                "memory_type": "context",
                "tags": [],
            }))
        );
    }

    #[test]
    fn test_search_without_query_uses_defaults() {
        let req = MemoryOperation::from_args("search", &args(json!({"tags": ["rust"]})))
            .unwrap()
            .into_request();
        assert_eq!(req.path, "/memory/search");
        assert_eq!(
            req.body,
            Some(json!({"query": "", "limit": 10, "threshold": 0.7, "tags": ["rust"]}))
        );
    }

    #[test]
    fn test_search_defaults() {
        let op = MemoryOperation::from_args("search", &args(json!({"query": "rust"}))).unwrap();
        let req = op.into_request();
        assert_eq!(req.path, "/memory/search");
        assert_eq!(
            req.body,
            Some(json!({"query": "rust", "limit": 10, "threshold": 0.7}))
        );
    }

    #[test]
    fn test_search_filters_from_resolver_args() {
        let op = MemoryOperation::from_args(
            "search",
            &args(json!({"query": "deploy", "limit": 3, "type": "project", "tags": ["ops"]})),
        )
        .unwrap();
        let body = op.into_request().body.unwrap();
        assert_eq!(body["limit"], json!(3));
        assert_eq!(body["memory_type"], json!("project"));
        assert_eq!(body["tags"], json!(["ops"]));
    }

    #[test]
    fn test_update_and_delete_require_id() {
        for action in ["update", "delete"] {
            let err = MemoryOperation::from_args(action, &CommandArgs::new()).unwrap_err();
            assert_eq!(err.to_string(), "Memory ID required");
        }
    }

    #[test]
    fn test_update_request_carries_only_present_fields() {
        let op = MemoryOperation::from_args("update", &args(json!({"id": "abc123", "content": "new"}))).unwrap();
        let req = op.into_request();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "/memory/abc123");
        assert_eq!(req.body, Some(json!({"content": "new"})));
    }

    #[test]
    fn test_delete_numeric_id() {
        let op = MemoryOperation::from_args("delete", &args(json!({"id": 42}))).unwrap();
        let req = op.into_request();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "/memory/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn test_list_query() {
        let op = MemoryOperation::from_args(
            "list",
            &args(json!({"limit": 5, "memory_type": "project", "tags": "a, b"})),
        )
        .unwrap();
        let req = op.into_request();
        assert_eq!(req.path, "/memory");
        assert_eq!(req.query_value("limit"), Some("5"));
        assert_eq!(req.query_value("memory_type"), Some("project"));
        assert_eq!(req.query_value("tags"), Some("a,b"));
    }

    #[test]
    fn test_fixed_paths() {
        let cases = [
            ("stats", "/memory/admin/stats"),
            ("topics", "/topics"),
            ("list-topics", "/topics"),
            ("health", "/health"),
        ];
        for (action, path) in cases {
            let req = MemoryOperation::from_args(action, &CommandArgs::new())
                .unwrap()
                .into_request();
            assert_eq!(req.method, HttpMethod::Get);
            assert_eq!(req.path, path);
        }
    }

    #[test]
    fn test_create_topic() {
        let err = MemoryOperation::from_args("create-topic", &CommandArgs::new()).unwrap_err();
        assert_eq!(err.to_string(), "Topic name required");

        let req = MemoryOperation::from_args("create-topic", &args(json!({"name": "Rust"})))
            .unwrap()
            .into_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body, Some(json!({"name": "Rust"})));
    }

    #[test]
    fn test_generic_api_call() {
        let err = MemoryOperation::from_args("api", &CommandArgs::new()).unwrap_err();
        assert_eq!(err.to_string(), "API path required");

        let req = MemoryOperation::from_args(
            "api",
            &args(json!({"method": "patch", "path": "memory/1/pin", "query": {"force": true}})),
        )
        .unwrap()
        .into_request();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "/memory/1/pin");
        assert_eq!(req.query_value("force"), Some("true"));
    }

    #[test]
    fn test_unknown_operation() {
        let err = MemoryOperation::from_args("frobnicate", &CommandArgs::new()).unwrap_err();
        assert!(matches!(err, MemoryError::InvalidArgument(_)));
        assert!(err.to_string().contains("frobnicate"));
    }
}
