//! The comparison operator catalog.
//!
//! Every [`Operator`] has one [`OperatorSpec`] entry describing which field
//! types it applies to and which value types it expects. The catalog drives
//! two decisions of the builder:
//!
//! - which operators are offered once a column (hence a field type) is chosen,
//!   see [`operators_for`]
//! - which input widget the value gets, see [`input_kind`]

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::QueryError, schema::FieldType};

/// Comparison operators for field conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// The field has no value.
    IsNull,
    /// The field has any value.
    IsNotNull,
    /// Exact match.
    Equals,
    /// Anything but an exact match.
    NotEquals,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    /// Day of the week of a date, 1 is Monday.
    DayOfWeek,
    /// Month of a date, 1 to 12.
    Month,
    /// Year of a date.
    Year,
}

/// A catalog entry describing where an operator may be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSpec {
    /// The operator this entry describes.
    pub operator: Operator,
    /// Field types the operator can be applied to.
    pub supported_field_types: &'static [FieldType],
    /// Value types the operator expects, empty when it takes no value.
    pub supported_value_types: &'static [FieldType],
    /// Human-readable description shown next to the operator.
    pub description: &'static str,
}

const ALL_TYPES: &[FieldType] = &[
    FieldType::String,
    FieldType::Numeric,
    FieldType::Boolean,
    FieldType::Date,
];
const ORDERED_TYPES: &[FieldType] = &[FieldType::Numeric, FieldType::Date];
const TEXT_TYPES: &[FieldType] = &[FieldType::String];
const DATE_TYPES: &[FieldType] = &[FieldType::Date];
const NUMERIC_TYPES: &[FieldType] = &[FieldType::Numeric];

const CATALOG: &[OperatorSpec] = &[
    OperatorSpec {
        operator: Operator::IsNull,
        supported_field_types: ALL_TYPES,
        supported_value_types: &[],
        description: "Checks if the field has no value",
    },
    OperatorSpec {
        operator: Operator::IsNotNull,
        supported_field_types: ALL_TYPES,
        supported_value_types: &[],
        description: "Checks if the field has any value",
    },
    OperatorSpec {
        operator: Operator::Equals,
        supported_field_types: ALL_TYPES,
        supported_value_types: ALL_TYPES,
        description: "Checks if the field exactly matches the given value",
    },
    OperatorSpec {
        operator: Operator::NotEquals,
        supported_field_types: ALL_TYPES,
        supported_value_types: ALL_TYPES,
        description: "Checks if the field does not match the given value",
    },
    OperatorSpec {
        operator: Operator::Contains,
        supported_field_types: TEXT_TYPES,
        supported_value_types: TEXT_TYPES,
        description: "Checks if the field contains the given text",
    },
    OperatorSpec {
        operator: Operator::StartsWith,
        supported_field_types: TEXT_TYPES,
        supported_value_types: TEXT_TYPES,
        description: "Checks if the field starts with the given text",
    },
    OperatorSpec {
        operator: Operator::EndsWith,
        supported_field_types: TEXT_TYPES,
        supported_value_types: TEXT_TYPES,
        description: "Checks if the field ends with the given text",
    },
    OperatorSpec {
        operator: Operator::GreaterThan,
        supported_field_types: ORDERED_TYPES,
        supported_value_types: ORDERED_TYPES,
        description: "Checks if the field is greater than the given value",
    },
    OperatorSpec {
        operator: Operator::LessThan,
        supported_field_types: ORDERED_TYPES,
        supported_value_types: ORDERED_TYPES,
        description: "Checks if the field is less than the given value",
    },
    OperatorSpec {
        operator: Operator::GreaterEqual,
        supported_field_types: ORDERED_TYPES,
        supported_value_types: ORDERED_TYPES,
        description: "Checks if the field is greater than or equal to the given value",
    },
    OperatorSpec {
        operator: Operator::LessEqual,
        supported_field_types: ORDERED_TYPES,
        supported_value_types: ORDERED_TYPES,
        description: "Checks if the field is less than or equal to the given value",
    },
    OperatorSpec {
        operator: Operator::DayOfWeek,
        supported_field_types: DATE_TYPES,
        supported_value_types: NUMERIC_TYPES,
        description: "Matches the day of the week (1-7, where 1 is Monday)",
    },
    OperatorSpec {
        operator: Operator::Month,
        supported_field_types: DATE_TYPES,
        supported_value_types: NUMERIC_TYPES,
        description: "Matches the month (1-12)",
    },
    OperatorSpec {
        operator: Operator::Year,
        supported_field_types: DATE_TYPES,
        supported_value_types: NUMERIC_TYPES,
        description: "Matches the year",
    },
];

/// Returns the full operator catalog in offer order.
pub fn catalog() -> &'static [OperatorSpec] {
    CATALOG
}

/// Returns the operators that may be offered for a field type, in catalog order.
pub fn operators_for(field_type: FieldType) -> Vec<Operator> {
    CATALOG
        .iter()
        .filter(|spec| spec.supported_field_types.contains(&field_type))
        .map(|spec| spec.operator)
        .collect()
}

impl Operator {
    /// All operators, in catalog order.
    pub fn all() -> impl Iterator<Item = Operator> {
        CATALOG.iter().map(|spec| spec.operator)
    }

    /// Returns the catalog entry of this operator.
    pub fn spec(&self) -> &'static OperatorSpec {
        // Catalog entries are declared in variant order.
        &CATALOG[*self as usize]
    }

    /// Returns `true` if the operator can be applied to the field type.
    pub fn supports(&self, field_type: FieldType) -> bool {
        self.spec().supported_field_types.contains(&field_type)
    }

    /// Returns `true` for `IS_NULL` and `IS_NOT_NULL`.
    pub fn is_null_check(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Returns `true` if the operator compares against a value.
    pub fn takes_value(&self) -> bool {
        !self.spec().supported_value_types.is_empty()
    }

    /// The wire name, e.g. `GREATER_THAN`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::Contains => "CONTAINS",
            Operator::StartsWith => "STARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::LessThan => "LESS_THAN",
            Operator::GreaterEqual => "GREATER_EQUAL",
            Operator::LessEqual => "LESS_EQUAL",
            Operator::DayOfWeek => "DAY_OF_WEEK",
            Operator::Month => "MONTH",
            Operator::Year => "YEAR",
        }
    }

    /// The label shown in the operator selector, e.g. `GREATER THAN`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::all()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::InvalidOperator(s.to_string()))
    }
}

/// The input widget a condition's value is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Free text input.
    Text,
    /// Numeric input.
    Number,
    /// Date picker (`YYYY-MM-DD`).
    Date,
    /// A `true` / `false` selector.
    BooleanSelect,
}

impl InputKind {
    fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => InputKind::Text,
            FieldType::Numeric => InputKind::Number,
            FieldType::Boolean => InputKind::BooleanSelect,
            FieldType::Date => InputKind::Date,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputKind::Text => "text",
            InputKind::Number => "number",
            InputKind::Date => "date",
            InputKind::BooleanSelect => "select",
        })
    }
}

/// Decides which input widget a value gets.
///
/// Falls back to text until both the field type and the operator are known.
/// Otherwise the operator's value type matching the field type wins, then the
/// operator's first value type, then the field type itself.
pub fn input_kind(field_type: Option<FieldType>, operator: Option<Operator>) -> InputKind {
    let (Some(field_type), Some(operator)) = (field_type, operator) else {
        return InputKind::Text;
    };

    let value_types = operator.spec().supported_value_types;
    let value_type = if value_types.contains(&field_type) {
        field_type
    } else {
        value_types.first().copied().unwrap_or(field_type)
    };

    InputKind::for_type(value_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operator_has_a_catalog_entry() {
        assert_eq!(catalog().len(), 14);
        for op in Operator::all() {
            assert_eq!(op.spec().operator, op);
            assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
        }
    }

    #[test]
    fn string_fields_are_offered_text_operators_only() {
        let offered = operators_for(FieldType::String);

        assert!(offered.contains(&Operator::Contains));
        assert!(offered.contains(&Operator::IsNull));
        assert!(!offered.contains(&Operator::GreaterThan));
        assert!(!offered.contains(&Operator::Year));
    }

    #[test]
    fn offered_operators_always_support_the_field_type() {
        for field_type in FieldType::ALL {
            for op in operators_for(field_type) {
                assert!(op.supports(field_type), "{op} offered for {field_type}");
            }
        }
    }

    #[test]
    fn boolean_fields_only_compare_for_equality() {
        assert_eq!(
            operators_for(FieldType::Boolean),
            vec![
                Operator::IsNull,
                Operator::IsNotNull,
                Operator::Equals,
                Operator::NotEquals,
            ]
        );
    }

    #[test]
    fn null_checks_take_no_value() {
        assert!(Operator::IsNull.is_null_check());
        assert!(!Operator::IsNull.takes_value());
        assert!(Operator::Equals.takes_value());
        assert!(!Operator::Equals.is_null_check());
    }

    #[test]
    fn input_kind_follows_value_type() {
        assert_eq!(input_kind(None, Some(Operator::Equals)), InputKind::Text);
        assert_eq!(input_kind(Some(FieldType::Date), None), InputKind::Text);
        assert_eq!(
            input_kind(Some(FieldType::Date), Some(Operator::GreaterThan)),
            InputKind::Date
        );
        assert_eq!(
            input_kind(Some(FieldType::Date), Some(Operator::Month)),
            InputKind::Number
        );
        assert_eq!(
            input_kind(Some(FieldType::Boolean), Some(Operator::Equals)),
            InputKind::BooleanSelect
        );
        assert_eq!(
            input_kind(Some(FieldType::Numeric), Some(Operator::IsNull)),
            InputKind::Number
        );
    }

    #[test]
    fn label_replaces_underscores() {
        assert_eq!(Operator::GreaterEqual.label(), "GREATER EQUAL");
        assert_eq!(Operator::Year.label(), "YEAR");
    }
}
