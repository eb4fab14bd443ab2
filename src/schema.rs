//! Schema conformance gate.
//!
//! Operates on the raw `serde_json::Value`, not the typed model, so a
//! single pass can report *every* defect in a malformed document. All
//! checks mirror the published LSA artifact schema: required fields,
//! value types, id and hash patterns, enumerations, length floors, and
//! rejection of unknown fields at every nesting level.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::EntityKind;

/// Minimum statement length, in characters.
pub const MIN_STATEMENT_LEN: usize = 10;

/// Constraint category attached to each schema violation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SchemaRule {
    Required,
    Type,
    Pattern,
    Enum,
    MinItems,
    MinLength,
    Range,
    UnknownField,
    Duplicate,
}

impl SchemaRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type => "type",
            Self::Pattern => "pattern",
            Self::Enum => "enum",
            Self::MinItems => "min_items",
            Self::MinLength => "min_length",
            Self::Range => "range",
            Self::UnknownField => "unknown_field",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for SchemaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One conformance defect found in a raw document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SchemaViolation {
    /// Dotted location of the offending value, `root` for the document.
    pub path: String,
    pub rule: SchemaRule,
    pub message: String,
}

impl SchemaViolation {
    fn new(path: String, rule: SchemaRule, message: String) -> Self {
        Self { path, rule, message }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

static PREMISE_ID_RE: OnceLock<Regex> = OnceLock::new();
static INFERENCE_ID_RE: OnceLock<Regex> = OnceLock::new();
static CONTRADICTION_ID_RE: OnceLock<Regex> = OnceLock::new();
static CONCLUSION_ID_RE: OnceLock<Regex> = OnceLock::new();
static SOURCE_SHA_RE: OnceLock<Regex> = OnceLock::new();
static HEX64_RE: OnceLock<Regex> = OnceLock::new();
static BYTE_RANGE_RE: OnceLock<Regex> = OnceLock::new();
static METHODOLOGY_RE: OnceLock<Regex> = OnceLock::new();

fn get_premise_id_re() -> &'static Regex {
    PREMISE_ID_RE.get_or_init(|| Regex::new(r"^premise-[0-9]+$").expect("valid regex"))
}

fn get_inference_id_re() -> &'static Regex {
    INFERENCE_ID_RE.get_or_init(|| Regex::new(r"^inference-[0-9]+$").expect("valid regex"))
}

fn get_contradiction_id_re() -> &'static Regex {
    CONTRADICTION_ID_RE.get_or_init(|| Regex::new(r"^contradiction-[0-9]+$").expect("valid regex"))
}

fn get_conclusion_id_re() -> &'static Regex {
    CONCLUSION_ID_RE.get_or_init(|| Regex::new(r"^conclusion-[0-9]+$").expect("valid regex"))
}

fn get_source_sha_re() -> &'static Regex {
    SOURCE_SHA_RE.get_or_init(|| Regex::new(r"^([a-f0-9]{64}|private)$").expect("valid regex"))
}

fn get_hex64_re() -> &'static Regex {
    HEX64_RE.get_or_init(|| Regex::new(r"^[a-f0-9]{64}$").expect("valid regex"))
}

fn get_byte_range_re() -> &'static Regex {
    BYTE_RANGE_RE.get_or_init(|| Regex::new(r"^[0-9]+-[0-9]+$").expect("valid regex"))
}

fn get_methodology_re() -> &'static Regex {
    METHODOLOGY_RE.get_or_init(|| Regex::new(r"^LSA::").expect("valid regex"))
}

fn id_re(kind: EntityKind) -> &'static Regex {
    match kind {
        EntityKind::Premise => get_premise_id_re(),
        EntityKind::Inference => get_inference_id_re(),
        EntityKind::Contradiction => get_contradiction_id_re(),
        EntityKind::Conclusion => get_conclusion_id_re(),
    }
}

const TOP_LEVEL_FIELDS: [&str; 5] = [
    "premises",
    "inferences",
    "contradictions",
    "conclusions",
    "audit",
];

const PREMISE_FIELDS: [&str; 7] = [
    "id",
    "statement",
    "source_sha256",
    "byte_range",
    "confidence",
    "source_type",
    "contradiction_check",
];

const INFERENCE_FIELDS: [&str; 6] = [
    "id",
    "supports",
    "methodology",
    "statement",
    "confidence",
    "contradiction_check",
];

const CONTRADICTION_FIELDS: [&str; 7] = [
    "id",
    "targets",
    "statement",
    "label",
    "source_sha256",
    "byte_range",
    "confidence",
];

const CONCLUSION_FIELDS: [&str; 7] = [
    "id",
    "supports",
    "contested_by",
    "statement",
    "decision_state",
    "confidence",
    "contradiction_check",
];

const AUDIT_FIELDS: [&str; 4] = ["author", "timestamp", "hash", "signing_key"];

const PREMISE_CHECK_FIELDS: [&str; 3] = ["performed", "exempt", "exempt_reason"];

const INFERENCE_CHECK_FIELDS: [&str; 7] = [
    "performed",
    "exempt",
    "exempt_reason",
    "timestamp",
    "search_queries",
    "sources_searched",
    "contradictions_found",
];

const CONCLUSION_CHECK_FIELDS: [&str; 8] = [
    "performed",
    "exempt",
    "exempt_reason",
    "timestamp",
    "search_queries",
    "sources_searched",
    "contradictions_found",
    "methodology",
];

/// Validate a raw document against the LSA artifact schema.
///
/// Collects every violation rather than stopping at the first. An
/// empty result means the document conforms.
pub fn validate(document: &Value) -> Vec<SchemaViolation> {
    let mut out = Vec::new();

    let Some(root) = document.as_object() else {
        out.push(SchemaViolation::new(
            "root".to_string(),
            SchemaRule::Type,
            "Invalid type (expected object)".to_string(),
        ));
        return out;
    };

    for field in TOP_LEVEL_FIELDS {
        if !root.contains_key(field) {
            out.push(SchemaViolation::new(
                "root".to_string(),
                SchemaRule::Required,
                format!("Missing required field '{}'", field),
            ));
        }
    }
    unknown_fields(root, "root", &TOP_LEVEL_FIELDS, &mut out);

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for kind in [
        EntityKind::Premise,
        EntityKind::Inference,
        EntityKind::Contradiction,
        EntityKind::Conclusion,
    ] {
        let section = kind.section();
        let Some(value) = root.get(section) else {
            continue;
        };
        let Some(items) = value.as_array() else {
            out.push(SchemaViolation::new(
                section.to_string(),
                SchemaRule::Type,
                "Invalid type (expected array)".to_string(),
            ));
            continue;
        };
        for (i, item) in items.iter().enumerate() {
            let path = format!("{}.{}", section, i);
            let Some(obj) = item.as_object() else {
                out.push(SchemaViolation::new(
                    path,
                    SchemaRule::Type,
                    "Invalid type (expected object)".to_string(),
                ));
                continue;
            };
            match kind {
                EntityKind::Premise => check_premise(obj, &path, &mut seen_ids, &mut out),
                EntityKind::Inference => check_inference(obj, &path, &mut seen_ids, &mut out),
                EntityKind::Contradiction => {
                    check_contradiction(obj, &path, &mut seen_ids, &mut out)
                }
                EntityKind::Conclusion => check_conclusion(obj, &path, &mut seen_ids, &mut out),
            }
        }
    }

    if let Some(audit) = root.get("audit") {
        check_audit(audit, &mut out);
    }

    out
}

fn check_premise<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    seen: &mut HashSet<&'a str>,
    out: &mut Vec<SchemaViolation>,
) {
    require_fields(obj, path, &["id", "statement", "source_sha256", "byte_range"], out);
    unknown_fields(obj, path, &PREMISE_FIELDS, out);
    check_id(obj, path, EntityKind::Premise, seen, out);
    check_statement(obj, path, out);
    check_pattern(obj, path, "source_sha256", get_source_sha_re(), out);
    check_byte_range(obj, path, out);
    check_confidence(obj, path, out);
    check_string(obj, path, "source_type", out);
    check_contradiction_check(obj, path, &PREMISE_CHECK_FIELDS, out);
}

fn check_inference<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    seen: &mut HashSet<&'a str>,
    out: &mut Vec<SchemaViolation>,
) {
    require_fields(obj, path, &["id", "supports", "methodology", "statement"], out);
    unknown_fields(obj, path, &INFERENCE_FIELDS, out);
    check_id(obj, path, EntityKind::Inference, seen, out);
    check_string_array(obj, path, "supports", 1, out);
    check_pattern(obj, path, "methodology", get_methodology_re(), out);
    check_statement(obj, path, out);
    check_confidence(obj, path, out);
    check_contradiction_check(obj, path, &INFERENCE_CHECK_FIELDS, out);
}

fn check_contradiction<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    seen: &mut HashSet<&'a str>,
    out: &mut Vec<SchemaViolation>,
) {
    require_fields(obj, path, &["id", "targets", "statement", "label"], out);
    unknown_fields(obj, path, &CONTRADICTION_FIELDS, out);
    check_id(obj, path, EntityKind::Contradiction, seen, out);
    check_string_array(obj, path, "targets", 1, out);
    check_statement(obj, path, out);
    check_enum(obj, path, "label", &["FACT(CONTESTED)"], out);
    check_pattern(obj, path, "source_sha256", get_source_sha_re(), out);
    check_byte_range(obj, path, out);
    check_confidence(obj, path, out);
}

fn check_conclusion<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    seen: &mut HashSet<&'a str>,
    out: &mut Vec<SchemaViolation>,
) {
    require_fields(
        obj,
        path,
        &["id", "supports", "contested_by", "statement", "decision_state"],
        out,
    );
    unknown_fields(obj, path, &CONCLUSION_FIELDS, out);
    check_id(obj, path, EntityKind::Conclusion, seen, out);
    check_string_array(obj, path, "supports", 0, out);
    check_string_array(obj, path, "contested_by", 0, out);
    check_statement(obj, path, out);
    check_enum(obj, path, "decision_state", &["approved", "pending", "rejected"], out);
    check_confidence(obj, path, out);
    check_contradiction_check(obj, path, &CONCLUSION_CHECK_FIELDS, out);
}

fn check_audit(value: &Value, out: &mut Vec<SchemaViolation>) {
    let path = "audit";
    let Some(obj) = value.as_object() else {
        out.push(SchemaViolation::new(
            path.to_string(),
            SchemaRule::Type,
            "Invalid type (expected object)".to_string(),
        ));
        return;
    };
    require_fields(obj, path, &AUDIT_FIELDS, out);
    unknown_fields(obj, path, &AUDIT_FIELDS, out);
    check_string(obj, path, "author", out);
    check_string(obj, path, "timestamp", out);
    check_pattern(obj, path, "hash", get_hex64_re(), out);
    check_string(obj, path, "signing_key", out);
}

fn check_contradiction_check(
    obj: &Map<String, Value>,
    path: &str,
    allowed: &[&str],
    out: &mut Vec<SchemaViolation>,
) {
    let Some(value) = obj.get("contradiction_check") else {
        return;
    };
    let path = format!("{}.contradiction_check", path);
    let Some(check) = value.as_object() else {
        out.push(SchemaViolation::new(
            path,
            SchemaRule::Type,
            "Invalid type (expected object)".to_string(),
        ));
        return;
    };
    unknown_fields(check, &path, allowed, out);
    check_bool(check, &path, "performed", out);
    check_bool(check, &path, "exempt", out);
    check_string(check, &path, "exempt_reason", out);
    if allowed.contains(&"timestamp") {
        check_string(check, &path, "timestamp", out);
        check_string_array(check, &path, "search_queries", 0, out);
        check_count(check, &path, "sources_searched", out);
        check_count(check, &path, "contradictions_found", out);
    }
    if allowed.contains(&"methodology") {
        check_string(check, &path, "methodology", out);
    }
}

fn require_fields(
    obj: &Map<String, Value>,
    path: &str,
    fields: &[&str],
    out: &mut Vec<SchemaViolation>,
) {
    for field in fields {
        if !obj.contains_key(*field) {
            out.push(SchemaViolation::new(
                path.to_string(),
                SchemaRule::Required,
                format!("Missing required field '{}'", field),
            ));
        }
    }
}

fn unknown_fields(
    obj: &Map<String, Value>,
    path: &str,
    allowed: &[&str],
    out: &mut Vec<SchemaViolation>,
) {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            out.push(SchemaViolation::new(
                path.to_string(),
                SchemaRule::UnknownField,
                format!("Unknown field '{}'", key),
            ));
        }
    }
}

/// Fetch a string field, reporting a type violation when it is present
/// but not a string.
fn string_field<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    field: &str,
    out: &mut Vec<SchemaViolation>,
) -> Option<&'a str> {
    match obj.get(field) {
        None => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            out.push(SchemaViolation::new(
                format!("{}.{}", path, field),
                SchemaRule::Type,
                "Invalid type (expected string)".to_string(),
            ));
            None
        }
    }
}

fn check_string(obj: &Map<String, Value>, path: &str, field: &str, out: &mut Vec<SchemaViolation>) {
    string_field(obj, path, field, out);
}

fn check_id<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    kind: EntityKind,
    seen: &mut HashSet<&'a str>,
    out: &mut Vec<SchemaViolation>,
) {
    let Some(id) = string_field(obj, path, "id", out) else {
        return;
    };
    if !id_re(kind).is_match(id) {
        out.push(SchemaViolation::new(
            format!("{}.id", path),
            SchemaRule::Pattern,
            "Value does not match required pattern".to_string(),
        ));
    }
    if !seen.insert(id) {
        out.push(SchemaViolation::new(
            format!("{}.id", path),
            SchemaRule::Duplicate,
            format!("Duplicate id '{}'", id),
        ));
    }
}

fn check_statement(obj: &Map<String, Value>, path: &str, out: &mut Vec<SchemaViolation>) {
    if let Some(s) = string_field(obj, path, "statement", out) {
        if s.chars().count() < MIN_STATEMENT_LEN {
            out.push(SchemaViolation::new(
                format!("{}.statement", path),
                SchemaRule::MinLength,
                format!("String must be at least {} characters", MIN_STATEMENT_LEN),
            ));
        }
    }
}

fn check_pattern(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
    re: &Regex,
    out: &mut Vec<SchemaViolation>,
) {
    if let Some(s) = string_field(obj, path, field, out) {
        if !re.is_match(s) {
            out.push(SchemaViolation::new(
                format!("{}.{}", path, field),
                SchemaRule::Pattern,
                "Value does not match required pattern".to_string(),
            ));
        }
    }
}

fn check_enum(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
    allowed: &[&str],
    out: &mut Vec<SchemaViolation>,
) {
    if let Some(s) = string_field(obj, path, field, out) {
        if !allowed.contains(&s) {
            out.push(SchemaViolation::new(
                format!("{}.{}", path, field),
                SchemaRule::Enum,
                format!("Value must be one of [{}]", allowed.join(", ")),
            ));
        }
    }
}

fn check_confidence(obj: &Map<String, Value>, path: &str, out: &mut Vec<SchemaViolation>) {
    let Some(value) = obj.get("confidence") else {
        return;
    };
    let Some(c) = value.as_f64() else {
        out.push(SchemaViolation::new(
            format!("{}.confidence", path),
            SchemaRule::Type,
            "Invalid type (expected number)".to_string(),
        ));
        return;
    };
    if c < 0.0 {
        out.push(SchemaViolation::new(
            format!("{}.confidence", path),
            SchemaRule::Range,
            format!("Value {} is less than the minimum of 0", c),
        ));
    } else if c > 1.0 {
        out.push(SchemaViolation::new(
            format!("{}.confidence", path),
            SchemaRule::Range,
            format!("Value {} is greater than the maximum of 1", c),
        ));
    }
}

fn check_byte_range(obj: &Map<String, Value>, path: &str, out: &mut Vec<SchemaViolation>) {
    let Some(s) = string_field(obj, path, "byte_range", out) else {
        return;
    };
    if !get_byte_range_re().is_match(s) {
        out.push(SchemaViolation::new(
            format!("{}.byte_range", path),
            SchemaRule::Pattern,
            "Value does not match required pattern".to_string(),
        ));
        return;
    }
    let Some((start, end)) = s.split_once('-') else {
        return;
    };
    match (start.parse::<u64>(), end.parse::<u64>()) {
        (Ok(start), Ok(end)) => {
            if start > end {
                out.push(SchemaViolation::new(
                    format!("{}.byte_range", path),
                    SchemaRule::Range,
                    format!("Invalid byte_range: start ({}) must be <= end ({})", start, end),
                ));
            }
        }
        _ => {
            out.push(SchemaViolation::new(
                format!("{}.byte_range", path),
                SchemaRule::Range,
                "Byte offset exceeds representable range".to_string(),
            ));
        }
    }
}

fn check_string_array(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
    min_items: usize,
    out: &mut Vec<SchemaViolation>,
) {
    let Some(value) = obj.get(field) else {
        return;
    };
    let Some(items) = value.as_array() else {
        out.push(SchemaViolation::new(
            format!("{}.{}", path, field),
            SchemaRule::Type,
            "Invalid type (expected array)".to_string(),
        ));
        return;
    };
    if items.len() < min_items {
        out.push(SchemaViolation::new(
            format!("{}.{}", path, field),
            SchemaRule::MinItems,
            format!("Array must have at least {} item(s)", min_items),
        ));
    }
    for (i, item) in items.iter().enumerate() {
        if !item.is_string() {
            out.push(SchemaViolation::new(
                format!("{}.{}.{}", path, field, i),
                SchemaRule::Type,
                "Invalid type (expected string)".to_string(),
            ));
        }
    }
}

fn check_bool(obj: &Map<String, Value>, path: &str, field: &str, out: &mut Vec<SchemaViolation>) {
    if let Some(value) = obj.get(field) {
        if !value.is_boolean() {
            out.push(SchemaViolation::new(
                format!("{}.{}", path, field),
                SchemaRule::Type,
                "Invalid type (expected boolean)".to_string(),
            ));
        }
    }
}

fn check_count(obj: &Map<String, Value>, path: &str, field: &str, out: &mut Vec<SchemaViolation>) {
    let Some(value) = obj.get(field) else {
        return;
    };
    if let Some(n) = value.as_i64() {
        if n < 0 {
            out.push(SchemaViolation::new(
                format!("{}.{}", path, field),
                SchemaRule::Range,
                format!("Value {} is less than the minimum of 0", n),
            ));
        }
    } else if value.as_u64().is_none() {
        out.push(SchemaViolation::new(
            format!("{}.{}", path, field),
            SchemaRule::Type,
            "Invalid type (expected integer)".to_string(),
        ));
    }
}
