use regex::RegexBuilder;

use crate::collection::Document;
use crate::common::{Value, DOC_ID};
use crate::errors::StoreResult;

/// A declarative filter over a document's fields.
///
/// A query is a conjunction: every clause must hold for a document to
/// match (implicit AND). An empty query matches every document in the
/// collection.
///
/// Clauses are built with the fluent methods and combined freely:
///
/// ```ignore
/// // {category: "seeds", price: {$gte: 100, $lte: 500}}
/// let query = Query::new()
///     .eq("category", "seeds")
///     .gte("price", 100)
///     .lte("price", 500);
///
/// // {$or: [{region: "fergana"}, {region: "andijan"}]}
/// let query = or(vec![
///     Query::new().eq("region", "fergana"),
///     Query::new().eq("region", "andijan"),
/// ]);
/// ```
///
/// The same query evaluates in process against the emulation backend
/// ([Query::matches]) and lowers to the native backend's wire filter; the
/// operator surface is fixed to what both backends honor identically:
/// equality, `$or`, pattern match (with optional case-insensitivity),
/// `$gte`, `$lte`, and `$in`.
#[derive(Clone, Debug, Default)]
pub struct Query {
    pub(crate) clauses: Vec<Clause>,
}

#[derive(Clone, Debug)]
pub(crate) enum Clause {
    /// A condition on a single field.
    Field {
        field: String,
        condition: FieldCondition,
    },
    /// Logical OR: at least one sub-query must match.
    Or(Vec<Query>),
}

#[derive(Clone, Debug)]
pub(crate) enum FieldCondition {
    /// Strict equality with a literal value.
    Eq(Value),
    /// One or more operators, all of which must pass independently.
    Ops(Vec<Operator>),
}

#[derive(Clone, Debug)]
pub(crate) enum Operator {
    /// Inclusive lower bound, numeric or lexical.
    Gte(Value),
    /// Inclusive upper bound, numeric or lexical.
    Lte(Value),
    /// Membership in the given list.
    In(Vec<Value>),
    /// Substring/regular-expression search (not a full match).
    Regex {
        pattern: String,
        case_insensitive: bool,
    },
}

impl Query {
    /// Creates an empty query, which matches every document.
    pub fn new() -> Self {
        Query {
            clauses: Vec::new(),
        }
    }

    /// Creates a query matching a document by its identity.
    pub fn id(id: &str) -> Self {
        Query::new().eq(DOC_ID, id)
    }

    /// Adds an equality condition on a field.
    ///
    /// Equality against [Value::Null] also matches a document where the
    /// field is absent.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Field {
            field: field.to_string(),
            condition: FieldCondition::Eq(value.into()),
        });
        self
    }

    /// Adds an inclusive lower bound on a field (`$gte`).
    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_operator(field, Operator::Gte(value.into()))
    }

    /// Adds an inclusive upper bound on a field (`$lte`).
    ///
    /// Combined with [Query::gte] on the same field this forms a range
    /// query; both bounds must pass independently.
    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push_operator(field, Operator::Lte(value.into()))
    }

    /// Adds a membership condition on a field (`$in`).
    pub fn one_of<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push_operator(field, Operator::In(values))
    }

    /// Adds a case-sensitive pattern-match condition on a field.
    ///
    /// The pattern is a regular expression searched anywhere in the
    /// field's textual form, not anchored to the whole value.
    pub fn regex(self, field: &str, pattern: &str) -> Self {
        self.push_operator(
            field,
            Operator::Regex {
                pattern: pattern.to_string(),
                case_insensitive: false,
            },
        )
    }

    /// Adds a case-insensitive pattern-match condition on a field.
    pub fn regex_ignore_case(self, field: &str, pattern: &str) -> Self {
        self.push_operator(
            field,
            Operator::Regex {
                pattern: pattern.to_string(),
                case_insensitive: true,
            },
        )
    }

    /// Adds a logical-OR clause: a document passes it when at least one of
    /// the sub-queries matches.
    pub fn any_of(mut self, queries: Vec<Query>) -> Self {
        self.clauses.push(Clause::Or(queries));
        self
    }

    /// Checks if the query has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the identity value when this query's sole predicate is an
    /// identity equality, enabling a direct key lookup instead of a scan.
    pub(crate) fn as_id_lookup(&self) -> Option<&str> {
        match self.clauses.as_slice() {
            [Clause::Field { field, condition }] if field == DOC_ID => match condition {
                FieldCondition::Eq(Value::String(id)) => Some(id),
                _ => None,
            },
            _ => None,
        }
    }

    /// Evaluates the query against a single document.
    ///
    /// # Errors
    ///
    /// [crate::errors::ErrorKind::FilterError] when a pattern clause does
    /// not compile; no other condition produces an error.
    pub fn matches(&self, document: &Document) -> StoreResult<bool> {
        for clause in &self.clauses {
            match clause {
                Clause::Field { field, condition } => {
                    let value = document.get(field);
                    match condition {
                        FieldCondition::Eq(literal) => match value {
                            Some(v) => {
                                if v != literal {
                                    return Ok(false);
                                }
                            }
                            None => {
                                if !literal.is_null() {
                                    return Ok(false);
                                }
                            }
                        },
                        FieldCondition::Ops(operators) => {
                            for operator in operators {
                                if !apply_operator(operator, value)? {
                                    return Ok(false);
                                }
                            }
                        }
                    }
                }
                Clause::Or(queries) => {
                    let mut any = false;
                    for query in queries {
                        if query.matches(document)? {
                            any = true;
                            break;
                        }
                    }
                    if !any {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn push_operator(mut self, field: &str, operator: Operator) -> Self {
        // merge into an existing operator set on the same field so that
        // gte + lte form a single range condition
        for clause in self.clauses.iter_mut().rev() {
            if let Clause::Field {
                field: existing,
                condition: FieldCondition::Ops(operators),
            } = clause
            {
                if existing == field {
                    operators.push(operator);
                    return self;
                }
            }
        }
        self.clauses.push(Clause::Field {
            field: field.to_string(),
            condition: FieldCondition::Ops(vec![operator]),
        });
        self
    }
}

fn apply_operator(operator: &Operator, value: Option<&Value>) -> StoreResult<bool> {
    match operator {
        Operator::Gte(bound) => {
            let actual = coerce_missing(value, bound);
            Ok(actual.compare(bound) != std::cmp::Ordering::Less)
        }
        Operator::Lte(bound) => {
            let actual = coerce_missing(value, bound);
            Ok(actual.compare(bound) != std::cmp::Ordering::Greater)
        }
        Operator::In(candidates) => match value {
            Some(v) => Ok(candidates.iter().any(|candidate| candidate == v)),
            None => Ok(candidates.iter().any(Value::is_null)),
        },
        Operator::Regex {
            pattern,
            case_insensitive,
        } => {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(*case_insensitive)
                .build()?;
            let text = value.map(Value::to_text).unwrap_or_default();
            Ok(regex.is_match(&text))
        }
    }
}

/// A missing or null field compares as the identity element of the bound's
/// type: 0 for numeric ranges, the empty string for lexical ones.
fn coerce_missing(value: Option<&Value>, bound: &Value) -> Value {
    match value {
        Some(v) if !v.is_null() => v.clone(),
        _ => match bound {
            Value::I64(_) | Value::F64(_) => Value::I64(0),
            Value::String(_) => Value::String(String::new()),
            _ => Value::Null,
        },
    }
}

/// Creates a query that matches all documents.
pub fn all() -> Query {
    Query::new()
}

/// Creates a query that matches a document by its identity.
pub fn by_id(id: &str) -> Query {
    Query::id(id)
}

/// Combines multiple queries using logical OR.
pub fn or(queries: Vec<Query>) -> Query {
    Query::new().any_of(queries)
}
