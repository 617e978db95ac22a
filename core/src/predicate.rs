//! Tagged predicate trees and their derivation from ids, entities and examples.

use crate::dialect::Dialect;
use crate::error::{CruditeError, Result};
use crate::mapper::{ClassMap, TableMap};
use crate::params::Parameters;
use crate::value::Value;
use uuid::Uuid;

/// Field predicate operators. Negation flips each to its complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
}

impl Operator {
    pub const fn as_sql(&self, negate: bool) -> &'static str {
        match (self, negate) {
            (Operator::Eq, false) => "=",
            (Operator::Eq, true) => "<>",
            (Operator::Gt, false) => ">",
            (Operator::Gt, true) => "<=",
            (Operator::Ge, false) => ">=",
            (Operator::Ge, true) => "<",
            (Operator::Lt, false) => "<",
            (Operator::Lt, true) => ">=",
            (Operator::Le, false) => "<=",
            (Operator::Le, true) => ">",
            (Operator::Like, false) => "LIKE",
            (Operator::Like, true) => "NOT LIKE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOperator {
    And,
    Or,
}

impl GroupOperator {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            GroupOperator::And => " AND ",
            GroupOperator::Or => " OR ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub property_name: String,
    pub operator: Operator,
    pub value: Value,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    pub operator: GroupOperator,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Field(FieldPredicate),
    Group(PredicateGroup),
}

impl Predicate {
    pub fn field(property_name: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Predicate::Field(FieldPredicate {
            property_name: property_name.into(),
            operator,
            value: value.into(),
            negate: false,
        })
    }

    pub fn eq(property_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(property_name, Operator::Eq, value)
    }

    /// Flips a field predicate; groups are returned unchanged.
    pub fn not(mut self) -> Self {
        if let Predicate::Field(ref mut field) = self {
            field.negate = !field.negate;
        }
        self
    }

    /// Combines with AND. No children yields `None`; one child yields that
    /// child rather than a group.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::combine(GroupOperator::And, predicates.into_iter().collect())
    }

    /// Combines with OR, under the same rules as [`Predicate::all`].
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::combine(GroupOperator::Or, predicates.into_iter().collect())
    }

    fn combine(operator: GroupOperator, mut predicates: Vec<Predicate>) -> Option<Self> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::Group(PredicateGroup {
                operator,
                predicates,
            })),
        }
    }

    /// Renders against a table map, pushing one bind parameter per non-null
    /// field value.
    pub fn to_sql(&self, table: &TableMap, dialect: Dialect, params: &mut Parameters) -> Result<String> {
        match self {
            Predicate::Field(field) => {
                let column = dialect.quote(&table.require_column(&field.property_name)?.column_name);
                if field.value.is_null() {
                    return match (field.operator, field.negate) {
                        (Operator::Eq, false) => Ok(format!("({column} IS NULL)")),
                        (Operator::Eq, true) => Ok(format!("({column} IS NOT NULL)")),
                        (op, _) => Err(CruditeError::configuration(format!(
                            "operator {op:?} cannot compare `{}` against null",
                            field.property_name
                        ))),
                    };
                }
                let placeholder = params.push(field.value.clone());
                Ok(format!(
                    "({column} {} {placeholder})",
                    field.operator.as_sql(field.negate)
                ))
            }
            Predicate::Group(group) if group.predicates.is_empty() => Ok(match group.operator {
                GroupOperator::And => "(1=1)".to_string(),
                GroupOperator::Or => "(1=0)".to_string(),
            }),
            Predicate::Group(group) => {
                let parts = group
                    .predicates
                    .iter()
                    .map(|p| p.to_sql(table, dialect, params))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", parts.join(group.operator.as_sql())))
            }
        }
    }
}

/// Sort direction for one property.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sort {
    pub property_name: String,
    pub ascending: bool,
}

impl Sort {
    pub fn asc(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            ascending: true,
        }
    }

    pub fn desc(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            ascending: false,
        }
    }
}

/// A typed identifier for get / delete by id.
#[derive(Debug, Clone, PartialEq)]
pub enum Id {
    Scalar(Value),
    /// Values keyed by key property name
    Composite(Vec<(String, Value)>),
}

impl Id {
    pub fn composite<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Id::Composite(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

macro_rules! scalar_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Id {
                fn from(value: $ty) -> Self {
                    Id::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_id!(i32, i64, u32, &str, String, Uuid, Value);

/// Ordered (property, value) pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<(String, Value)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// By-example filter: every listed property must equal its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example(FieldSet);

impl Example {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Example(self.0.with(name, value))
    }

    pub fn fields(&self) -> &FieldSet {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<FieldSet> for Example {
    fn from(fields: FieldSet) -> Self {
        Example(fields)
    }
}

/// Filter argument accepted by the select, count and delete families.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Predicate(Predicate),
    Example(Example),
}

impl From<Predicate> for Filter {
    fn from(predicate: Predicate) -> Self {
        Filter::Predicate(predicate)
    }
}

impl From<Example> for Filter {
    fn from(example: Example) -> Self {
        Filter::Example(example)
    }
}

/// Builds the filter matching one identifier.
pub fn identifier_predicate(table: &TableMap, id: &Id) -> Result<Predicate> {
    let keys: Vec<_> = table.keys().collect();
    match id {
        Id::Scalar(value) => match keys.as_slice() {
            [key] => Ok(Predicate::eq(key.name.clone(), value.clone())),
            _ => Err(CruditeError::configuration(format!(
                "{} has {} key columns; a scalar id needs exactly one",
                table.entity_name,
                keys.len()
            ))),
        },
        Id::Composite(pairs) => {
            let predicates = keys
                .iter()
                .map(|key| {
                    pairs
                        .iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(&key.name))
                        .map(|(_, value)| Predicate::eq(key.name.clone(), value.clone()))
                        .ok_or_else(|| {
                            CruditeError::configuration(format!(
                                "id for {} is missing key `{}`",
                                table.entity_name, key.name
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            Predicate::all(predicates).ok_or_else(|| no_key_column(table))
        }
    }
}

/// Builds the filter matching an entity's current key values.
pub fn key_predicate<T>(map: &ClassMap<T>, entity: &T) -> Result<Predicate> {
    let predicates = map
        .key_values(entity)
        .into_iter()
        .map(|(info, value)| Predicate::eq(info.name.clone(), value));
    Predicate::all(predicates).ok_or_else(|| no_key_column(map.table()))
}

/// Every pair becomes an equality; an empty example is no filter.
pub fn by_example_predicate(example: &Example) -> Option<Predicate> {
    Predicate::all(
        example
            .fields()
            .iter()
            .map(|(name, value)| Predicate::eq(name, value.clone())),
    )
}

pub fn resolve_predicate(filter: Option<&Filter>) -> Option<Predicate> {
    match filter? {
        Filter::Predicate(predicate) => Some(predicate.clone()),
        Filter::Example(example) => by_example_predicate(example),
    }
}

fn no_key_column(table: &TableMap) -> CruditeError {
    CruditeError::configuration(format!("{} has no key column", table.entity_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{ColumnInfo, KeyKind};
    use crate::params::PlaceholderStyle;

    fn table(keys: &[(&str, KeyKind)]) -> TableMap {
        let mut columns: Vec<ColumnInfo> = keys
            .iter()
            .map(|(name, kind)| ColumnInfo::new(*name, *kind))
            .collect();
        let mut name = ColumnInfo::new("Name", KeyKind::NotAKey);
        name.column_name = "name".into();
        columns.push(name);
        columns.push(ColumnInfo::new("Age", KeyKind::NotAKey));
        TableMap {
            entity_name: "Person".into(),
            table_name: "people".into(),
            schema_name: None,
            columns,
        }
    }

    #[test]
    fn single_child_is_not_wrapped() {
        let only = Predicate::eq("Name", "a");
        assert_eq!(Predicate::all([only.clone()]), Some(only));
        assert_eq!(Predicate::any(Vec::new()), None);
    }

    #[test]
    fn group_renders_children_joined() {
        let t = table(&[("Id", KeyKind::Identity)]);
        let mut params = Parameters::new(PlaceholderStyle::AtSign);
        let group = Predicate::any([
            Predicate::eq("Name", "a"),
            Predicate::field("Age", Operator::Gt, 30),
            Predicate::eq("Id", Value::Null).not(),
        ])
        .unwrap();
        assert_eq!(
            group.to_sql(&t, Dialect::SQLite, &mut params).unwrap(),
            "((\"name\" = @p0) OR (\"Age\" > @p1) OR (\"Id\" IS NOT NULL))"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn negated_operators() {
        let t = table(&[("Id", KeyKind::Identity)]);
        let mut params = Parameters::new(PlaceholderStyle::Positional);
        let sql = Predicate::field("Name", Operator::Like, "a%")
            .not()
            .to_sql(&t, Dialect::MySQL, &mut params)
            .unwrap();
        assert_eq!(sql, "(`name` NOT LIKE ?)");
    }

    #[test]
    fn unknown_property_is_rejected() {
        let t = table(&[("Id", KeyKind::Identity)]);
        let mut params = Parameters::default();
        let err = Predicate::eq("Nope", 1)
            .to_sql(&t, Dialect::SQLite, &mut params)
            .unwrap_err();
        assert!(matches!(err, CruditeError::Configuration(_)));
    }

    #[test]
    fn identifier_for_scalar_key() {
        let t = table(&[("Id", KeyKind::Identity)]);
        let predicate = identifier_predicate(&t, &Id::from(5)).unwrap();
        assert_eq!(predicate, Predicate::eq("Id", 5));
    }

    #[test]
    fn identifier_for_composite_key() {
        let t = table(&[("TenantId", KeyKind::Assigned), ("Code", KeyKind::Assigned)]);
        let id = Id::composite([("code", Value::from("x")), ("TenantId", Value::from(2))]);
        let predicate = identifier_predicate(&t, &id).unwrap();
        assert_eq!(
            predicate,
            Predicate::Group(PredicateGroup {
                operator: GroupOperator::And,
                predicates: vec![Predicate::eq("TenantId", 2), Predicate::eq("Code", "x")],
            })
        );
    }

    #[test]
    fn identifier_shape_mismatches() {
        let composite = table(&[("TenantId", KeyKind::Assigned), ("Code", KeyKind::Assigned)]);
        assert!(identifier_predicate(&composite, &Id::from(1)).is_err());

        let missing = Id::composite([("TenantId", 2)]);
        assert!(identifier_predicate(&composite, &missing).is_err());

        let keyless = table(&[]);
        assert!(identifier_predicate(&keyless, &Id::from(1)).is_err());
    }

    #[test]
    fn example_resolution() {
        assert_eq!(by_example_predicate(&Example::new()), None);

        let filter = Filter::from(Example::new().with("Name", "a").with("Age", 3));
        let resolved = resolve_predicate(Some(&filter)).unwrap();
        assert!(matches!(resolved, Predicate::Group(ref g) if g.predicates.len() == 2));

        assert_eq!(resolve_predicate(None), None);
    }
}
