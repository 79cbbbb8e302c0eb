//! CMDB table schema metadata.
//!
//! FortiOS describes every CMDB table on request (`action=schema`): field
//! names, types, required flags, defaults, enum options, and nested child
//! tables. [`ObjectSchema`] is the parsed form of that dump, and
//! [`ObjectSchema::validate`] checks a payload against it before it goes
//! to the device. Validation is advisory — the device remains the
//! authority — so it reports issues instead of failing requests.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Field type as declared in the schema dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    VarString,
    Integer,
    /// Enumerated value; the valid names are in [`FieldSchema::options`].
    Enum,
    Ipv4Address,
    Ipv4Classnet,
    Ipv4Netmask,
    Ipv6Address,
    Ipv6Network,
    MacAddress,
    Password,
    /// Reference to an admin user name.
    User,
    /// Nested child table.
    Table,
    /// Type name this client does not model.
    Other(String),
}

impl FieldType {
    /// Map a schema type name onto a [`FieldType`].
    pub fn from_name(name: &str) -> FieldType {
        match name {
            "string" => FieldType::String,
            "var-string" => FieldType::VarString,
            "integer" => FieldType::Integer,
            "option" => FieldType::Enum,
            "ipv4-address" | "ipv4-address-any" => FieldType::Ipv4Address,
            "ipv4-classnet" | "ipv4-classnet-any" | "ipv4-classnet-host" => FieldType::Ipv4Classnet,
            "ipv4-netmask" | "ipv4-netmask-any" => FieldType::Ipv4Netmask,
            "ipv6-address" => FieldType::Ipv6Address,
            "ipv6-network" | "ipv6-prefix" => FieldType::Ipv6Network,
            "mac-address" => FieldType::MacAddress,
            "password" | "password-2" | "password-3" => FieldType::Password,
            "user" => FieldType::User,
            "table" => FieldType::Table,
            other => FieldType::Other(other.to_string()),
        }
    }
}

/// One valid value of an enumerated field.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionDef {
    /// Value name as sent on the wire.
    pub name: String,

    /// Help text from the schema dump.
    pub help: Option<String>,
}

/// Schema of a single CMDB field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSchema {
    /// Raw type name from the dump (see [`FieldSchema::field_type`]).
    #[serde(rename = "type", default)]
    pub type_name: String,

    /// Help text.
    pub help: Option<String>,

    /// Whether the device requires this field on create.
    #[serde(default, deserialize_with = "de_flag")]
    pub required: bool,

    /// Whether multiple space-separated values are accepted.
    #[serde(default, deserialize_with = "de_flag")]
    pub multiple_values: bool,

    /// Default value applied when the field is omitted.
    pub default: Option<Value>,

    /// Valid values for enumerated fields.
    #[serde(default)]
    pub options: Vec<OptionDef>,

    /// Lower bound for integer fields.
    #[serde(rename = "min-value")]
    pub min_value: Option<i64>,

    /// Upper bound for integer fields.
    #[serde(rename = "max-value")]
    pub max_value: Option<i64>,

    /// Maximum length for string fields.
    pub size: Option<u64>,

    /// Category ("unitary" or "table").
    pub category: Option<String>,

    /// Child table mkey, for table fields.
    pub mkey: Option<String>,

    /// Child table fields, for table fields.
    #[serde(default)]
    pub children: IndexMap<String, FieldSchema>,
}

impl FieldSchema {
    /// The parsed field type.
    pub fn field_type(&self) -> FieldType {
        FieldType::from_name(&self.type_name)
    }

    /// Whether this field is a nested child table.
    pub fn is_table(&self) -> bool {
        self.category.as_deref() == Some("table") || !self.children.is_empty()
    }

    fn allows(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.name == value)
    }
}

/// Parsed schema of a CMDB table.
///
/// Field order follows the dump, which follows the device configuration
/// order.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSchema {
    /// Table name (e.g. "address").
    #[serde(default)]
    pub name: String,

    /// Table path (e.g. "firewall").
    #[serde(default)]
    pub path: String,

    /// Primary-key field name.
    pub mkey: Option<String>,

    /// Primary-key type name.
    pub mkey_type: Option<String>,

    /// Help text.
    pub help: Option<String>,

    /// Field schemas, in device order.
    #[serde(default)]
    pub children: IndexMap<String, FieldSchema>,
}

/// One problem found by [`ObjectSchema::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The offending field, or the payload root.
    pub field: String,

    /// What is wrong with it.
    pub message: String,
}

impl ObjectSchema {
    /// Parse the `results` of an `action=schema` response.
    pub fn from_results(value: &Value) -> Result<ObjectSchema> {
        serde_json::from_value(value.clone()).map_err(|e| ClientError::Decode(e).into())
    }

    /// Look up a field schema by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.children.get(name)
    }

    /// Check a payload against this schema.
    ///
    /// Reports missing required fields, unknown fields, enum values outside
    /// the declared options, integers outside their declared range, strings
    /// over their declared size, and non-array values for child tables.
    pub fn validate(&self, payload: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let Some(object) = payload.as_object() else {
            issues.push(ValidationIssue {
                field: String::new(),
                message: "payload must be an object".to_string(),
            });
            return issues;
        };

        for (name, field) in &self.children {
            if field.required && !object.contains_key(name) {
                issues.push(ValidationIssue {
                    field: name.clone(),
                    message: "required field is missing".to_string(),
                });
            }
        }

        for (name, value) in object {
            let Some(field) = self.children.get(name) else {
                issues.push(ValidationIssue {
                    field: name.clone(),
                    message: "unknown field".to_string(),
                });
                continue;
            };
            self.check_field(name, field, value, &mut issues);
        }

        issues
    }

    fn check_field(
        &self,
        name: &str,
        field: &FieldSchema,
        value: &Value,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if field.is_table() {
            if !value.is_array() {
                issues.push(ValidationIssue {
                    field: name.to_string(),
                    message: "child table expects an array of members".to_string(),
                });
            }
            return;
        }

        match field.field_type() {
            FieldType::Integer => {
                let Some(n) = value.as_i64() else {
                    issues.push(ValidationIssue {
                        field: name.to_string(),
                        message: "expected an integer".to_string(),
                    });
                    return;
                };
                if field.min_value.is_some_and(|min| n < min)
                    || field.max_value.is_some_and(|max| n > max)
                {
                    issues.push(ValidationIssue {
                        field: name.to_string(),
                        message: format!(
                            "value {} outside range {:?}..={:?}",
                            n, field.min_value, field.max_value
                        ),
                    });
                }
            }
            FieldType::Enum => {
                let Some(s) = value.as_str() else {
                    issues.push(ValidationIssue {
                        field: name.to_string(),
                        message: "expected an option name".to_string(),
                    });
                    return;
                };
                let candidates: Vec<&str> = if field.multiple_values {
                    s.split_whitespace().collect()
                } else {
                    vec![s]
                };
                for candidate in candidates {
                    if !field.allows(candidate) {
                        issues.push(ValidationIssue {
                            field: name.to_string(),
                            message: format!("'{}' is not a valid option", candidate),
                        });
                    }
                }
            }
            _ => {
                let Some(s) = value.as_str() else {
                    // Non-string scalars for string-ish types are device-rejected
                    issues.push(ValidationIssue {
                        field: name.to_string(),
                        message: "expected a string".to_string(),
                    });
                    return;
                };
                if field.size.is_some_and(|size| s.len() as u64 > size) {
                    issues.push(ValidationIssue {
                        field: name.to_string(),
                        message: format!("exceeds maximum length of {}", field.size.unwrap_or(0)),
                    });
                }
            }
        }
    }
}

/// FortiOS encodes booleans in schema dumps as 0/1 or true/false
/// depending on the build.
fn de_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address_schema() -> ObjectSchema {
        let dump = json!({
            "name": "address",
            "path": "firewall",
            "mkey": "name",
            "mkey_type": "string",
            "help": "Configure IPv4 addresses.",
            "children": {
                "name": {
                    "type": "string",
                    "help": "Address name.",
                    "required": 1,
                    "size": 79
                },
                "type": {
                    "type": "option",
                    "help": "Type of address.",
                    "default": "ipmask",
                    "options": [
                        {"name": "ipmask", "help": "Standard IPv4 address with subnet mask."},
                        {"name": "iprange", "help": "Range of IPv4 addresses."},
                        {"name": "fqdn", "help": "Fully qualified domain name."}
                    ]
                },
                "subnet": {
                    "type": "ipv4-classnet-any",
                    "help": "IP address and subnet mask."
                },
                "color": {
                    "type": "integer",
                    "help": "Color of icon on the GUI.",
                    "default": 0,
                    "min-value": 0,
                    "max-value": 32
                },
                "allow-routing": {
                    "type": "option",
                    "help": "Enable/disable use in static routes.",
                    "default": "disable",
                    "options": [
                        {"name": "enable", "help": null},
                        {"name": "disable", "help": null}
                    ]
                },
                "tagging": {
                    "type": "table",
                    "category": "table",
                    "help": "Config object tagging.",
                    "mkey": "name",
                    "children": {
                        "name": {"type": "string", "help": "Tagging entry name.", "size": 63}
                    }
                }
            }
        });
        ObjectSchema::from_results(&dump).unwrap()
    }

    #[test]
    fn test_parse_preserves_field_order() {
        let schema = address_schema();
        assert_eq!(schema.mkey.as_deref(), Some("name"));
        let fields: Vec<&String> = schema.children.keys().collect();
        assert_eq!(
            fields,
            ["name", "type", "subnet", "color", "allow-routing", "tagging"]
        );

        let ty = schema.field("type").unwrap();
        assert_eq!(ty.field_type(), FieldType::Enum);
        assert_eq!(ty.options.len(), 3);
        assert!(schema.field("tagging").unwrap().is_table());
    }

    #[test]
    fn test_valid_payload_has_no_issues() {
        let schema = address_schema();
        let payload = json!({
            "name": "lan",
            "type": "ipmask",
            "subnet": "10.0.0.0 255.255.255.0",
            "color": 3,
            "tagging": [{"name": "site-a"}]
        });
        assert!(schema.validate(&payload).is_empty());
    }

    #[test]
    fn test_missing_required_and_unknown_fields() {
        let schema = address_schema();
        let issues = schema.validate(&json!({"typ": "ipmask"}));

        assert!(issues.iter().any(|i| i.field == "name" && i.message.contains("required")));
        assert!(issues.iter().any(|i| i.field == "typ" && i.message.contains("unknown")));
    }

    #[test]
    fn test_option_membership() {
        let schema = address_schema();
        let issues = schema.validate(&json!({"name": "x", "type": "geographic"}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "type");
    }

    #[test]
    fn test_integer_range_and_string_size() {
        let schema = address_schema();

        let issues = schema.validate(&json!({"name": "x", "color": 40}));
        assert!(issues.iter().any(|i| i.field == "color"));

        let long_name = "a".repeat(80);
        let issues = schema.validate(&json!({"name": long_name}));
        assert!(issues.iter().any(|i| i.field == "name" && i.message.contains("length")));
    }

    #[test]
    fn test_table_field_expects_array() {
        let schema = address_schema();
        let issues = schema.validate(&json!({"name": "x", "tagging": {"name": "t"}}));
        assert!(issues.iter().any(|i| i.field == "tagging"));
    }

    #[test]
    fn test_flag_decoding_variants() {
        let f: FieldSchema =
            serde_json::from_value(json!({"type": "string", "required": true})).unwrap();
        assert!(f.required);

        let f: FieldSchema = serde_json::from_value(json!({"type": "string", "required": 0})).unwrap();
        assert!(!f.required);

        let f: FieldSchema = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert!(!f.required);
    }
}
