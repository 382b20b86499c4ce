//! # Config Validator
//!
//! Validates the loosely typed option tables passed to `init`, `load` and
//! `setUserDetails` against a per-command allow-list.
//!
//! ## Overview
//!
//! Each command declares its accepted keys as a static [`FieldSpec`] slice.
//! [`validate`] walks a table in three passes and stops at the first
//! failure:
//!
//! 1. **Key sweep** - every present key must be on the allow-list and carry
//!    the declared primitive type (nested tables are swept recursively)
//! 2. **Required keys** - absence is reported separately from a type error
//! 3. **Enumerated values** - string options restricted to a fixed set
//!
//! Validation has no side effects. The typed option structs
//! ([`InitOptions`], [`LoadOptions`], [`UserDetailsOptions`]) are built from
//! a successful validation only.
//!
//! ## Usage
//!
//! ```rust
//! use core_survey::options::{LoadOptions, OptionTable};
//! use core_survey::placement::VerticalAlign;
//!
//! let table = OptionTable::new()
//!     .with("yAlign", "top")
//!     .with("padding", 8.0);
//! let options = LoadOptions::parse(&table).unwrap();
//! assert_eq!(options.y_align, Some(VerticalAlign::Top));
//! assert_eq!(options.padding, 8);
//!
//! let bad = OptionTable::new().with("foo", 1.0);
//! assert!(LoadOptions::parse(&bad).is_err());
//! ```

use crate::error::{CommandError, Result};
use crate::placement::{HorizontalAlign, VerticalAlign};
use crate::session::ListenerHandle;
use bridge_traits::sdk::Gender;
use std::collections::BTreeMap;

// ============================================================================
// Loosely Typed Values
// ============================================================================

/// A value passed from the host scripting runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Table(OptionTable),
    Function(ListenerHandle),
}

impl OptionValue {
    /// Host-facing type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Nil => "nil",
            OptionValue::Bool(_) => "boolean",
            OptionValue::Number(_) => "number",
            OptionValue::String(_) => "string",
            OptionValue::Table(_) => "table",
            OptionValue::Function(_) => "function",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, OptionValue::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&OptionTable> {
        match self {
            OptionValue::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Number(f64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<OptionTable> for OptionValue {
    fn from(value: OptionTable) -> Self {
        OptionValue::Table(value)
    }
}

impl From<ListenerHandle> for OptionValue {
    fn from(value: ListenerHandle) -> Self {
        OptionValue::Function(value)
    }
}

/// JSON maps to the scripting value model: objects and arrays become tables
/// (arrays keyed `"1"`, `"2"`, ...), `null` becomes nil.
impl From<serde_json::Value> for OptionValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => OptionValue::Nil,
            Value::Bool(b) => OptionValue::Bool(b),
            Value::Number(n) => OptionValue::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => OptionValue::String(s),
            Value::Array(items) => OptionValue::Table(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| ((i + 1).to_string(), OptionValue::from(item)))
                    .collect(),
            ),
            Value::Object(map) => OptionValue::Table(
                map.into_iter()
                    .map(|(key, item)| (key, OptionValue::from(item)))
                    .collect(),
            ),
        }
    }
}

/// String-keyed table, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionTable {
    entries: Vec<(String, OptionValue)>,
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, OptionValue)> for OptionTable {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        let mut table = OptionTable::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Expected type of an option.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Bool,
    Number,
    String,
    /// Nested table with its own allow-list
    Table(&'static [FieldSpec]),
    /// Accepted with any type and discarded
    Ignored,
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "boolean",
            FieldKind::Number => "number",
            FieldKind::String => "string",
            FieldKind::Table(_) => "table",
            FieldKind::Ignored => "any",
        }
    }

    fn accepts(&self, value: &OptionValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Bool, OptionValue::Bool(_))
                | (FieldKind::Number, OptionValue::Number(_))
                | (FieldKind::String, OptionValue::String(_))
                | (FieldKind::Table(_), OptionValue::Table(_))
                | (FieldKind::Ignored, _)
        )
    }
}

/// Closed set of string values.
#[derive(Debug, Clone, Copy)]
pub struct Choices {
    /// Noun used in the error message ("gender", "position", ...)
    pub label: &'static str,
    pub values: &'static [&'static str],
}

impl Choices {
    fn allowed(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("'{}'", v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One allow-listed option.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub choices: Option<Choices>,
}

impl FieldSpec {
    pub const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: false,
            choices: None,
        }
    }

    pub const fn required(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: true,
            choices: None,
        }
    }

    pub const fn one_of(key: &'static str, label: &'static str, values: &'static [&'static str]) -> Self {
        Self {
            key,
            kind: FieldKind::String,
            required: false,
            choices: Some(Choices { label, values }),
        }
    }
}

pub const INIT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("apiKey", FieldKind::String),
    FieldSpec::optional("developerMode", FieldKind::Bool),
    FieldSpec::optional("requestUUID", FieldKind::String),
    FieldSpec::optional("rewardMode", FieldKind::Bool),
];

pub const LOAD_FIELDS: &[FieldSpec] = &[
    FieldSpec::one_of("yAlign", "position", VerticalAlign::NAMES),
    FieldSpec::one_of("xAlign", "alignment", HorizontalAlign::NAMES),
    FieldSpec::optional("padding", FieldKind::Number),
    FieldSpec::optional("customMode", FieldKind::Bool),
    FieldSpec::optional("offerwallMode", FieldKind::Bool),
    FieldSpec::optional("rewardMode", FieldKind::Bool),
];

pub const LOCATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("longitude", FieldKind::Number),
    FieldSpec::optional("latitude", FieldKind::Number),
    FieldSpec::optional("horizontalAccuracy", FieldKind::Number),
];

pub const GENDER_NAMES: &[&str] = &["male", "female", "other"];

pub const USER_DETAILS_FIELDS: &[FieldSpec] = &[
    FieldSpec::one_of("gender", "gender", GENDER_NAMES),
    FieldSpec::optional("facebookId", FieldKind::String),
    FieldSpec::optional("twitterId", FieldKind::String),
    FieldSpec::optional("requestUUID", FieldKind::String),
    FieldSpec::optional("location", FieldKind::Table(LOCATION_FIELDS)),
    // Legacy keys still sent by older scripts
    FieldSpec::optional("age", FieldKind::Ignored),
    FieldSpec::optional("ageGroup", FieldKind::Ignored),
    FieldSpec::optional("customData", FieldKind::Ignored),
];

// ============================================================================
// Validation
// ============================================================================

/// Accepted values of a validated table, borrowed from the input.
#[derive(Debug, Default)]
pub struct Validated<'a> {
    values: BTreeMap<&'static str, &'a OptionValue>,
    tables: BTreeMap<&'static str, Validated<'a>>,
}

impl<'a> Validated<'a> {
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key) || self.tables.contains_key(key)
    }

    pub fn string(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied().and_then(OptionValue::as_str)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.as_bool())
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(|v| v.as_number())
    }

    pub fn table(&self, key: &str) -> Option<&Validated<'a>> {
        self.tables.get(key)
    }
}

/// Validates `table` against `fields`.
///
/// # Errors
///
/// The first of `UnknownOption`, `TypeMismatch`, `MissingRequired` or
/// `InvalidValue` encountered, in pass order.
pub fn validate<'a>(fields: &'static [FieldSpec], table: &'a OptionTable) -> Result<Validated<'a>> {
    let validated = sweep(fields, table, None)?;
    check_required(fields, &validated, None)?;
    check_choices(fields, &validated, None)?;
    Ok(validated)
}

fn relative_path(scope: Option<&str>, key: &str) -> String {
    match scope {
        Some(scope) => format!("{}.{}", scope, key),
        None => key.to_string(),
    }
}

fn option_path(scope: Option<&str>, key: &str) -> String {
    format!("options.{}", relative_path(scope, key))
}

fn sweep<'a>(
    fields: &'static [FieldSpec],
    table: &'a OptionTable,
    scope: Option<&str>,
) -> Result<Validated<'a>> {
    let mut validated = Validated::default();

    for (key, value) in table.iter() {
        // nil entries do not exist in a scripting table
        if value.is_nil() {
            continue;
        }

        let spec = fields
            .iter()
            .find(|spec| spec.key == key)
            .ok_or_else(|| CommandError::UnknownOption {
                path: relative_path(scope, key),
            })?;

        if !spec.kind.accepts(value) {
            return Err(CommandError::TypeMismatch {
                path: option_path(scope, key),
                expected: spec.kind.type_name(),
                got: value.type_name(),
            });
        }

        match (spec.kind, value) {
            (FieldKind::Ignored, _) => {}
            (FieldKind::Table(nested), OptionValue::Table(inner)) => {
                let path = relative_path(scope, key);
                let nested = sweep(nested, inner, Some(&path))?;
                validated.tables.insert(spec.key, nested);
            }
            _ => {
                validated.values.insert(spec.key, value);
            }
        }
    }

    Ok(validated)
}

fn check_required(
    fields: &'static [FieldSpec],
    validated: &Validated<'_>,
    scope: Option<&str>,
) -> Result<()> {
    for spec in fields {
        if spec.required && !validated.contains(spec.key) {
            return Err(CommandError::MissingRequired {
                path: option_path(scope, spec.key),
            });
        }
        if let (FieldKind::Table(nested), Some(inner)) = (spec.kind, validated.table(spec.key)) {
            let path = relative_path(scope, spec.key);
            check_required(nested, inner, Some(&path))?;
        }
    }
    Ok(())
}

fn check_choices(
    fields: &'static [FieldSpec],
    validated: &Validated<'_>,
    scope: Option<&str>,
) -> Result<()> {
    for spec in fields {
        if let (Some(choices), Some(value)) = (spec.choices, validated.string(spec.key)) {
            if !choices.values.contains(&value) {
                return Err(CommandError::InvalidValue {
                    path: option_path(scope, spec.key),
                    label: choices.label,
                    value: value.to_string(),
                    allowed: choices.allowed(),
                });
            }
        }
        if let (FieldKind::Table(nested), Some(inner)) = (spec.kind, validated.table(spec.key)) {
            let path = relative_path(scope, spec.key);
            check_choices(nested, inner, Some(&path))?;
        }
    }
    Ok(())
}

// ============================================================================
// Typed Options
// ============================================================================

/// Options accepted by `init`.
#[derive(Debug, Clone, PartialEq)]
pub struct InitOptions {
    pub api_key: String,
    pub developer_mode: bool,
    pub request_uuid: Option<String>,
    pub reward_mode: bool,
}

impl InitOptions {
    pub fn parse(table: &OptionTable) -> Result<Self> {
        let v = validate(INIT_FIELDS, table)?;
        Ok(Self {
            api_key: v.string("apiKey").unwrap_or_default().to_string(),
            developer_mode: v.bool("developerMode").unwrap_or(false),
            request_uuid: v.string("requestUUID").map(str::to_string),
            reward_mode: v.bool("rewardMode").unwrap_or(false),
        })
    }
}

/// Options accepted by `load`. Omitted flags are `false`, omitted padding is 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    pub y_align: Option<VerticalAlign>,
    pub x_align: Option<HorizontalAlign>,
    pub padding: i32,
    pub custom_mode: bool,
    pub offerwall_mode: bool,
    pub reward_mode: bool,
}

impl LoadOptions {
    pub fn parse(table: &OptionTable) -> Result<Self> {
        let v = validate(LOAD_FIELDS, table)?;
        Ok(Self {
            y_align: v.string("yAlign").and_then(VerticalAlign::from_name),
            x_align: v.string("xAlign").and_then(HorizontalAlign::from_name),
            // fractional padding truncates toward zero
            padding: v.number("padding").map(|n| n as i32).unwrap_or(0),
            custom_mode: v.bool("customMode").unwrap_or(false),
            offerwall_mode: v.bool("offerwallMode").unwrap_or(false),
            reward_mode: v.bool("rewardMode").unwrap_or(false),
        })
    }
}

/// Device location supplied to `setUserDetails`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    pub horizontal_accuracy: f64,
}

/// Options accepted by `setUserDetails`.
///
/// `facebook_id`, `twitter_id` and `location` are validated and kept here,
/// but the SDK's user-properties builder has no slot for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDetailsOptions {
    pub gender: Option<Gender>,
    pub facebook_id: Option<String>,
    pub twitter_id: Option<String>,
    pub request_uuid: Option<String>,
    pub location: Option<Location>,
}

impl UserDetailsOptions {
    pub fn parse(table: &OptionTable) -> Result<Self> {
        let v = validate(USER_DETAILS_FIELDS, table)?;
        let location = v.table("location").map(|loc| Location {
            longitude: loc.number("longitude").unwrap_or(0.0),
            latitude: loc.number("latitude").unwrap_or(0.0),
            horizontal_accuracy: loc.number("horizontalAccuracy").unwrap_or(0.0),
        });

        Ok(Self {
            gender: v.string("gender").and_then(Gender::from_name),
            facebook_id: v.string("facebookId").map(str::to_string),
            twitter_id: v.string("twitterId").map(str::to_string),
            request_uuid: v.string("requestUUID").map(str::to_string),
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_init_requires_api_key() {
        let table = OptionTable::new().with("developerMode", true);
        match InitOptions::parse(&table) {
            Err(CommandError::MissingRequired { path }) => assert_eq!(path, "options.apiKey"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_init_parses_all_fields() {
        let table = OptionTable::new()
            .with("apiKey", "K")
            .with("developerMode", true)
            .with("requestUUID", "user-1")
            .with("rewardMode", true);

        let options = InitOptions::parse(&table).unwrap();
        assert_eq!(
            options,
            InitOptions {
                api_key: "K".to_string(),
                developer_mode: true,
                request_uuid: Some("user-1".to_string()),
                reward_mode: true,
            }
        );
    }

    #[test]
    fn test_sweep_runs_before_required_check() {
        // unknown key wins over the missing apiKey
        let table = OptionTable::new().with("foo", 1);
        assert!(matches!(
            InitOptions::parse(&table),
            Err(CommandError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_type_mismatch_reports_path() {
        let table = OptionTable::new().with("apiKey", "K").with("developerMode", "yes");
        match InitOptions::parse(&table) {
            Err(CommandError::TypeMismatch {
                path,
                expected,
                got,
            }) => {
                assert_eq!(path, "options.developerMode");
                assert_eq!(expected, "boolean");
                assert_eq!(got, "string");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_required_checked_before_enum() {
        static FIELDS: &[FieldSpec] = &[
            FieldSpec::one_of("mode", "mode", &["a", "b"]),
            FieldSpec::required("name", FieldKind::String),
        ];
        let table = OptionTable::new().with("mode", "z");
        assert!(matches!(
            validate(FIELDS, &table),
            Err(CommandError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_load_defaults() {
        let options = LoadOptions::parse(&OptionTable::new()).unwrap();
        assert_eq!(options, LoadOptions::default());
    }

    #[test]
    fn test_load_parses_alignment_and_flags() {
        let table = OptionTable::new()
            .with("yAlign", "center")
            .with("xAlign", "left")
            .with("padding", 7.9)
            .with("customMode", true)
            .with("offerwallMode", true);

        let options = LoadOptions::parse(&table).unwrap();
        assert_eq!(options.y_align, Some(VerticalAlign::Center));
        assert_eq!(options.x_align, Some(HorizontalAlign::Left));
        assert_eq!(options.padding, 7);
        assert!(options.custom_mode);
        assert!(options.offerwall_mode);
        assert!(!options.reward_mode);
    }

    #[test]
    fn test_load_rejects_unknown_alignment() {
        let table = OptionTable::new().with("yAlign", "middle");
        match LoadOptions::parse(&table) {
            Err(err @ CommandError::InvalidValue { .. }) => assert_eq!(
                err.to_string(),
                "options.yAlign invalid position 'middle'. Valid values: 'top', 'center', 'bottom'"
            ),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_unknown_key() {
        let table = OptionTable::new().with("foo", 1);
        match LoadOptions::parse(&table) {
            Err(err) => assert_eq!(err.to_string(), "Invalid option 'foo'"),
            Ok(options) => panic!("accepted: {:?}", options),
        }
    }

    #[test]
    fn test_nil_values_are_absent() {
        let table = OptionTable::new()
            .with("apiKey", "K")
            .with("developerMode", OptionValue::Nil);
        let options = InitOptions::parse(&table).unwrap();
        assert!(!options.developer_mode);
    }

    #[test]
    fn test_user_details_legacy_keys_ignored() {
        let table = OptionTable::new()
            .with("age", 42)
            .with("ageGroup", "18-24")
            .with("customData", OptionTable::new().with("x", 1));
        let options = UserDetailsOptions::parse(&table).unwrap();
        assert_eq!(options, UserDetailsOptions::default());
    }

    #[test]
    fn test_user_details_gender() {
        let table = OptionTable::new().with("gender", "female");
        let options = UserDetailsOptions::parse(&table).unwrap();
        assert_eq!(options.gender, Some(Gender::Female));

        let table = OptionTable::new().with("gender", "bogus");
        match UserDetailsOptions::parse(&table) {
            Err(err) => assert_eq!(
                err.to_string(),
                "options.gender invalid gender 'bogus'. Valid values: 'male', 'female', 'other'"
            ),
            Ok(options) => panic!("accepted: {:?}", options),
        }
    }

    #[test]
    fn test_location_nested_validation() {
        let table = OptionTable::new().with(
            "location",
            OptionTable::new()
                .with("longitude", 23.7)
                .with("latitude", 37.9),
        );
        let options = UserDetailsOptions::parse(&table).unwrap();
        assert_eq!(
            options.location,
            Some(Location {
                longitude: 23.7,
                latitude: 37.9,
                horizontal_accuracy: 0.0,
            })
        );

        let table = OptionTable::new().with("location", OptionTable::new().with("altitude", 1));
        match UserDetailsOptions::parse(&table) {
            Err(CommandError::UnknownOption { path }) => assert_eq!(path, "location.altitude"),
            other => panic!("unexpected: {:?}", other),
        }

        let table = OptionTable::new().with("location", OptionTable::new().with("latitude", "n"));
        match UserDetailsOptions::parse(&table) {
            Err(CommandError::TypeMismatch { path, .. }) => {
                assert_eq!(path, "options.location.latitude")
            }
            other => panic!("unexpected: {:?}", other),
        }

        let table = OptionTable::new().with("location", 5);
        assert!(matches!(
            UserDetailsOptions::parse(&table),
            Err(CommandError::TypeMismatch { expected: "table", .. })
        ));
    }

    #[test]
    fn test_table_insert_replaces() {
        let mut table = OptionTable::new().with("a", 1).with("b", 2);
        table.insert("a", 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some(&OptionValue::Number(3.0)));
    }

    #[test]
    fn test_from_json() {
        let value = OptionValue::from(json!({
            "apiKey": "K",
            "developerMode": true,
            "tags": ["a", "b"],
            "missing": null
        }));
        let table = value.as_table().unwrap();
        assert_eq!(table.get("apiKey"), Some(&OptionValue::from("K")));
        assert_eq!(table.get("developerMode"), Some(&OptionValue::Bool(true)));
        assert_eq!(
            table.get("tags").and_then(|t| t.as_table()).and_then(|t| t.get("2")),
            Some(&OptionValue::from("b"))
        );
        assert_eq!(table.get("missing"), Some(&OptionValue::Nil));
    }
}
