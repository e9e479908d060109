use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::utils::phone::digits_only;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Uuid(Uuid),
    Bool(bool),
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue::Text(value.clone())
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Uuid(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring match.
    Contains,
    /// Exact match. Text values compare against the column cast to text so
    /// enum columns can be filtered by their label.
    Equals,
    /// Array column contains the value.
    Has,
    /// Substring match on the digits of both the column and the value.
    DigitsContains,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Field {
        column: &'static str,
        mode: MatchMode,
        value: FilterValue,
    },
    AnyOf(Vec<Clause>),
}

/// Folds optional `(column, value, mode)` criteria into one `AND` filter.
/// Criteria without a value are skipped; with none left the filter is
/// unrestricted and renders no `WHERE`.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    clauses: Vec<Clause>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<V: Into<FilterValue>>(
        mut self,
        column: &'static str,
        value: Option<V>,
        mode: MatchMode,
    ) -> Self {
        if let Some(clause) = value.and_then(|v| Self::clause(column, v.into(), mode)) {
            self.clauses.push(clause);
        }
        self
    }

    /// Matches when any of `columns` matches `value`.
    pub fn any_of(mut self, value: Option<&str>, columns: &[(&'static str, MatchMode)]) -> Self {
        let Some(value) = value else {
            return self;
        };

        let group: Vec<Clause> = columns
            .iter()
            .filter_map(|&(column, mode)| Self::clause(column, FilterValue::from(value), mode))
            .collect();

        if !group.is_empty() {
            self.clauses.push(Clause::AnyOf(group));
        }
        self
    }

    fn clause(column: &'static str, value: FilterValue, mode: MatchMode) -> Option<Clause> {
        let value = match (value, mode) {
            (FilterValue::Text(text), MatchMode::DigitsContains) => {
                FilterValue::Text(digits_only(&text))
            }
            (FilterValue::Text(text), _) => FilterValue::Text(text.trim().to_string()),
            (other, _) => other,
        };

        if matches!(value, FilterValue::Text(ref text) if text.is_empty()) {
            return None;
        }

        Some(Clause::Field {
            column,
            mode,
            value,
        })
    }

    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Appends ` WHERE ...` to `builder`, or nothing when unrestricted.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if self.is_unrestricted() {
            return;
        }
        builder.push(" WHERE ");
        self.push_conditions(builder);
    }

    /// Appends ` AND ...` for queries that already carry a `WHERE`.
    pub fn push_and(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if self.is_unrestricted() {
            return;
        }
        builder.push(" AND ");
        self.push_conditions(builder);
    }

    fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            push_clause(builder, clause);
        }
    }
}

fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, clause: &Clause) {
    match clause {
        Clause::AnyOf(group) => {
            builder.push("(");
            for (i, inner) in group.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                push_clause(builder, inner);
            }
            builder.push(")");
        }
        Clause::Field {
            column,
            mode,
            value,
        } => push_field(builder, column, *mode, value),
    }
}

fn push_field(
    builder: &mut QueryBuilder<'_, Postgres>,
    column: &str,
    mode: MatchMode,
    value: &FilterValue,
) {
    match (mode, value) {
        (MatchMode::Contains, FilterValue::Text(text)) => {
            builder.push(format!("{} ILIKE '%' || ", column));
            builder.push_bind(escape_like(text));
            builder.push(" || '%'");
        }
        (MatchMode::DigitsContains, FilterValue::Text(digits)) => {
            builder.push(format!(
                "regexp_replace(COALESCE({}, ''), '\\D', '', 'g') LIKE '%' || ",
                column
            ));
            builder.push_bind(digits.clone());
            builder.push(" || '%'");
        }
        (MatchMode::Has, FilterValue::Text(text)) => {
            builder.push_bind(text.clone());
            builder.push(format!(" = ANY({})", column));
        }
        (_, FilterValue::Text(text)) => {
            builder.push(format!("{}::TEXT = ", column));
            builder.push_bind(text.clone());
        }
        (_, FilterValue::Uuid(id)) => {
            builder.push(format!("{} = ", column));
            builder.push_bind(*id);
        }
        (_, FilterValue::Bool(flag)) => {
            builder.push(format!("{} = ", column));
            builder.push_bind(*flag);
        }
    }
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filter: &FilterBuilder) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM persons p");
        filter.push_where(&mut builder);
        builder.sql().to_string()
    }

    #[test]
    fn empty_filter_is_unrestricted() {
        let filter = FilterBuilder::new()
            .field("p.city", None::<String>, MatchMode::Contains)
            .field("p.state", Some("   "), MatchMode::Contains);

        assert!(filter.is_unrestricted());
        assert_eq!(render(&filter), "SELECT * FROM persons p");
    }

    #[test]
    fn present_values_are_and_combined() {
        let filter = FilterBuilder::new()
            .field("p.name", Some("jo"), MatchMode::Contains)
            .field("p.city", None::<String>, MatchMode::Contains)
            .field("p.state", Some("TX"), MatchMode::Contains);

        assert_eq!(filter.clauses().len(), 2);
        assert_eq!(
            render(&filter),
            "SELECT * FROM persons p WHERE p.name ILIKE '%' || $1 || '%' AND p.state ILIKE '%' || $2 || '%'"
        );
    }

    #[test]
    fn any_of_renders_or_group() {
        let filter = FilterBuilder::new().any_of(
            Some("jordan"),
            &[
                ("p.name", MatchMode::Contains),
                ("p.aliases", MatchMode::Has),
                ("p.city", MatchMode::Contains),
            ],
        );

        assert_eq!(
            render(&filter),
            "SELECT * FROM persons p WHERE (p.name ILIKE '%' || $1 || '%' OR $2 = ANY(p.aliases) OR p.city ILIKE '%' || $3 || '%')"
        );
    }

    #[test]
    fn phone_filter_matches_on_digits() {
        let filter =
            FilterBuilder::new().field("p.phone_number", Some("(555) 123"), MatchMode::DigitsContains);

        assert_eq!(
            filter.clauses(),
            &[Clause::Field {
                column: "p.phone_number",
                mode: MatchMode::DigitsContains,
                value: FilterValue::Text("555123".to_string()),
            }]
        );

        let no_digits =
            FilterBuilder::new().field("p.phone_number", Some("call me"), MatchMode::DigitsContains);
        assert!(no_digits.is_unrestricted());
    }

    #[test]
    fn equality_casts_text_and_binds_ids() {
        let author = Uuid::new_v4();
        let filter = FilterBuilder::new()
            .field("v.status", Some("PENDING"), MatchMode::Equals)
            .field("v.author_id", Some(author), MatchMode::Equals)
            .field("p.is_published", Some(true), MatchMode::Equals);

        assert_eq!(
            render(&filter),
            "SELECT * FROM persons p WHERE v.status::TEXT = $1 AND v.author_id = $2 AND p.is_published = $3"
        );
    }

    #[test]
    fn push_and_extends_existing_where() {
        let filter = FilterBuilder::new().field("p.title", Some("flag"), MatchMode::Contains);
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM posts p WHERE p.is_published");
        filter.push_and(&mut builder);

        assert_eq!(
            builder.sql(),
            "SELECT * FROM posts p WHERE p.is_published AND p.title ILIKE '%' || $1 || '%'"
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
