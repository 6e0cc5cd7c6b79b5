use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Node identifier as supplied by the caller (e.g. `"P1"`, `"R2"`, `"resource:db"`).
pub type NodeId = String;

/// Kind of a node in a resource allocation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Process,
    Resource,
}

const PROCESS_TAG: &str = "process:";
const RESOURCE_TAG: &str = "resource:";

/// `R1`, `r12`, `Res`, `Resource_db`, `res-7` ...
fn resource_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(r\d+|res(ource)?([_\-]\w+|\d+)?)$").expect("resource name regex")
    })
}

impl NodeKind {
    /// Infer the kind of a node from its identifier.
    ///
    /// An explicit `process:` / `resource:` prefix (case-insensitive) wins. Otherwise
    /// resource-looking names (`R<digits>`, `Res...`, `Resource...`) are resources and
    /// every other identifier is treated as a process.
    pub fn infer(id: &str) -> Self {
        if let Some(tagged) = Self::from_tag(id) {
            return tagged;
        }
        if resource_name_regex().is_match(id.trim()) {
            NodeKind::Resource
        } else {
            NodeKind::Process
        }
    }

    /// Explicit kind tag carried by the identifier, if any.
    pub fn from_tag(id: &str) -> Option<Self> {
        let lower = id.trim_start().to_ascii_lowercase();
        if lower.starts_with(RESOURCE_TAG) {
            Some(NodeKind::Resource)
        } else if lower.starts_with(PROCESS_TAG) {
            Some(NodeKind::Process)
        } else {
            None
        }
    }
}
