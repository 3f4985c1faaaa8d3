//! Result containers
//!
//! A fetch or search call returns a [`ResultSet`]: an ordered collection of
//! one resource type supporting client-side filtering, ordering, paging and
//! bulk delete. Filtering and ordering never mutate the source container;
//! each call builds a new view. The fields a type can be filtered or ordered
//! by are declared in its [`FieldDeclaration`](crate::object::FieldDeclaration)
//! table, not discovered per-instance; requests naming an undeclared field
//! are rejected.

use std::cmp::Ordering;

use regex::RegexBuilder;

use crate::client::Client;
use crate::object::{ApiResource, DeclaredFields};
use crate::{Error, Result};

/// Typed scalar view of one field value, the unit of filtering and ordering
#[derive(Debug, Clone, PartialEq)]
pub enum FieldToken {
    Str(String),
    Int(i64),
    Bool(bool),
    IntList(Vec<i64>),
}

impl FieldToken {
    /// String rendering used by equality on string literals and by `~`
    pub fn render(&self) -> String {
        match self {
            FieldToken::Str(v) => v.clone(),
            FieldToken::Int(v) => v.to_string(),
            FieldToken::Bool(v) => if *v { "1" } else { "0" }.to_string(),
            FieldToken::IntList(v) => v
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Numeric view for comparison operators; non-coercible values are None
    pub fn numeric(&self) -> Option<f64> {
        match self {
            FieldToken::Int(v) => Some(*v as f64),
            FieldToken::Str(v) => v.trim().parse().ok(),
            FieldToken::Bool(_) | FieldToken::IntList(_) => None,
        }
    }
}

/// Per-instance field value lookup backing the dynamic filter/order surface
pub trait FieldAccess {
    /// The declared field's current value, or None when unset
    fn field(&self, name: &str) -> Option<FieldToken>;
}

/// A literal predicate operand
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl Literal {
    fn render(&self) -> String {
        match self {
            Literal::Str(v) => v.clone(),
            Literal::Int(v) => v.to_string(),
            Literal::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            Literal::Int(v) => Some(*v as f64),
            Literal::Str(v) => v.trim().parse().ok(),
            Literal::Bool(_) => None,
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

/// A filter predicate over one declared field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Literal),
    Ne(Literal),
    /// Regex match on the field's string rendering, written in the
    /// delimiter-prefixed `/pattern/flags` form
    Matches(String),
    Lt(Literal),
    Le(Literal),
    Gt(Literal),
    Ge(Literal),
    In(Vec<Literal>),
    NotIn(Vec<Literal>),
}

impl Predicate {
    pub fn eq<L: Into<Literal>>(value: L) -> Self {
        Predicate::Eq(value.into())
    }

    pub fn ne<L: Into<Literal>>(value: L) -> Self {
        Predicate::Ne(value.into())
    }

    pub fn matches<S: Into<String>>(pattern: S) -> Self {
        Predicate::Matches(pattern.into())
    }

    pub fn lt<L: Into<Literal>>(value: L) -> Self {
        Predicate::Lt(value.into())
    }

    pub fn le<L: Into<Literal>>(value: L) -> Self {
        Predicate::Le(value.into())
    }

    pub fn gt<L: Into<Literal>>(value: L) -> Self {
        Predicate::Gt(value.into())
    }

    pub fn ge<L: Into<Literal>>(value: L) -> Self {
        Predicate::Ge(value.into())
    }

    pub fn one_of<L, I>(values: I) -> Self
    where
        L: Into<Literal>,
        I: IntoIterator<Item = L>,
    {
        Predicate::In(values.into_iter().map(Into::into).collect())
    }

    pub fn none_of<L, I>(values: I) -> Self
    where
        L: Into<Literal>,
        I: IntoIterator<Item = L>,
    {
        Predicate::NotIn(values.into_iter().map(Into::into).collect())
    }
}

/// Sort direction for [`ResultSet::order_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Compiled predicate, built once per filter call
struct Matcher<'a> {
    predicate: &'a Predicate,
    regex: Option<regex::Regex>,
}

impl<'a> Matcher<'a> {
    fn new(predicate: &'a Predicate) -> Result<Self> {
        let regex = match predicate {
            Predicate::Matches(pattern) => Some(compile_delimited(pattern)?),
            _ => None,
        };
        Ok(Self { predicate, regex })
    }

    fn matches(&self, token: Option<&FieldToken>) -> bool {
        match self.predicate {
            Predicate::Eq(lit) => token.map(|t| token_eq(t, lit)).unwrap_or(false),
            Predicate::Ne(lit) => token.map(|t| !token_eq(t, lit)).unwrap_or(true),
            Predicate::Matches(_) => match (token, &self.regex) {
                (Some(t), Some(re)) => re.is_match(&t.render()),
                _ => false,
            },
            Predicate::Lt(lit) => compare_numeric(token, lit, |o| o == Ordering::Less),
            Predicate::Le(lit) => compare_numeric(token, lit, |o| o != Ordering::Greater),
            Predicate::Gt(lit) => compare_numeric(token, lit, |o| o == Ordering::Greater),
            Predicate::Ge(lit) => compare_numeric(token, lit, |o| o != Ordering::Less),
            Predicate::In(list) => token
                .map(|t| list.iter().any(|lit| token_eq(t, lit)))
                .unwrap_or(false),
            Predicate::NotIn(list) => token
                .map(|t| !list.iter().any(|lit| token_eq(t, lit)))
                .unwrap_or(true),
        }
    }
}

fn token_eq(token: &FieldToken, literal: &Literal) -> bool {
    // membership semantics for list-valued fields
    if let FieldToken::IntList(values) = token {
        return match (literal.numeric(), literal) {
            (Some(n), _) => values.iter().any(|v| *v as f64 == n),
            (None, lit) => values.iter().any(|v| v.to_string() == lit.render()),
        };
    }
    match (token.numeric(), literal.numeric()) {
        (Some(a), Some(b)) => a == b,
        _ => token.render() == literal.render(),
    }
}

fn compare_numeric<F>(token: Option<&FieldToken>, literal: &Literal, accept: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    match (token.and_then(FieldToken::numeric), literal.numeric()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).map(&accept).unwrap_or(false),
        // non-coercible comparisons exclude the element
        _ => false,
    }
}

/// Compiles the delimiter-prefixed `/pattern/flags` regex form
fn compile_delimited(pattern: &str) -> Result<regex::Regex> {
    let invalid =
        || Error::validation("pattern", format!("'{}' is not a /pattern/flags regex", pattern));
    let rest = pattern.strip_prefix('/').ok_or_else(invalid)?;
    let close = rest.rfind('/').ok_or_else(invalid)?;
    let (body, flags) = (&rest[..close], &rest[close + 1..]);
    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                return Err(Error::validation(
                    "pattern",
                    format!("unsupported regex flag '{}'", other),
                ))
            }
        };
    }
    builder
        .build()
        .map_err(|e| Error::validation("pattern", format!("invalid regex: {}", e)))
}

fn token_cmp(a: &FieldToken, b: &FieldToken) -> Ordering {
    match (a, b) {
        (FieldToken::Int(x), FieldToken::Int(y)) => x.cmp(y),
        (FieldToken::Bool(x), FieldToken::Bool(y)) => x.cmp(y),
        (FieldToken::Str(x), FieldToken::Str(y)) => x.cmp(y),
        _ => match (a.numeric(), b.numeric()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.render().cmp(&b.render()),
        },
    }
}

/// Ordered, iterable collection of domain objects of one concrete type
#[derive(Debug, Clone, Default)]
pub struct ResultSet<T> {
    items: Vec<T>,
}

impl<T> ResultSet<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone> ResultSet<T> {
    /// Slice out one page; page numbers are 1-indexed, out-of-range pages
    /// are empty and the last page may be short
    pub fn get_page(&self, page: usize, page_size: usize) -> ResultSet<T> {
        if page == 0 || page_size == 0 {
            return ResultSet::new(Vec::new());
        }
        let start = (page - 1).saturating_mul(page_size);
        if start >= self.items.len() {
            return ResultSet::new(Vec::new());
        }
        let end = (start + page_size).min(self.items.len());
        ResultSet::new(self.items[start..end].to_vec())
    }
}

impl<T: DeclaredFields + FieldAccess + Clone> ResultSet<T> {
    /// New container holding the elements whose declared field matches the
    /// predicate, preserving relative order
    pub fn filter_by(&self, field: &str, predicate: &Predicate) -> Result<ResultSet<T>> {
        let decl = T::fields()
            .iter()
            .find(|d| d.name == field)
            .filter(|d| d.filterable)
            .ok_or_else(|| {
                Error::unsupported(
                    "ResultSet",
                    "filter_by",
                    format!("'{}' is not a declared filterable field", field),
                )
            })?;
        let matcher = Matcher::new(predicate)?;
        let items = self
            .items
            .iter()
            .filter(|item| matcher.matches(item.field(decl.name).as_ref()))
            .cloned()
            .collect();
        Ok(ResultSet::new(items))
    }

    /// New container sorted by the declared field; the sort is stable and
    /// elements without a value order last in both directions
    pub fn order_by(&self, field: &str, direction: Direction) -> Result<ResultSet<T>> {
        let decl = T::fields()
            .iter()
            .find(|d| d.name == field)
            .filter(|d| d.orderable)
            .ok_or_else(|| {
                Error::unsupported(
                    "ResultSet",
                    "order_by",
                    format!("'{}' is not a declared orderable field", field),
                )
            })?;
        let mut items = self.items.clone();
        items.sort_by(|a, b| match (a.field(decl.name), b.field(decl.name)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ordering = token_cmp(&x, &y);
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            }
        });
        Ok(ResultSet::new(items))
    }
}

impl<T: ApiResource> ResultSet<T> {
    /// Ordered identifiers of all contained objects, composite keys flattened
    pub fn collect_id(&self) -> Vec<i64> {
        self.items
            .iter()
            .filter_map(ApiResource::id)
            .flat_map(|id| id.parts().to_vec())
            .collect()
    }

    /// Delete every contained object in order, stopping at the first
    /// failure. Objects deleted before the failure stay deleted; there is no
    /// rollback.
    pub fn delete_all(&self, client: &Client) -> Result<()> {
        for item in &self.items {
            client.delete(item)?;
        }
        Ok(())
    }
}

impl<T> IntoIterator for ResultSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for ResultSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ResultSet::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::FieldDeclaration;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        title: String,
        priority: Option<i64>,
        flagged: bool,
        group_ids: Vec<i64>,
    }

    impl Row {
        fn new(title: &str, priority: Option<i64>) -> Self {
            Self {
                title: title.to_string(),
                priority,
                flagged: false,
                group_ids: Vec::new(),
            }
        }
    }

    static ROW_FIELDS: &[FieldDeclaration] = &[
        FieldDeclaration::new("title", "title").filter_order(),
        FieldDeclaration::new("priority", "priority").filter_order(),
        FieldDeclaration::new("flagged", "flagged").filter(),
        FieldDeclaration::new("group_ids", "groupid").filter(),
        FieldDeclaration::new("hidden", "hidden"),
    ];

    impl DeclaredFields for Row {
        fn fields() -> &'static [FieldDeclaration] {
            ROW_FIELDS
        }
    }

    impl FieldAccess for Row {
        fn field(&self, name: &str) -> Option<FieldToken> {
            match name {
                "title" => Some(FieldToken::Str(self.title.clone())),
                "priority" => self.priority.map(FieldToken::Int),
                "flagged" => Some(FieldToken::Bool(self.flagged)),
                "group_ids" => Some(FieldToken::IntList(self.group_ids.clone())),
                _ => None,
            }
        }
    }

    fn rows() -> ResultSet<Row> {
        ResultSet::new(vec![
            Row::new("Urgent problems", Some(1)),
            Row::new("Printers", Some(2)),
            Row::new("General", Some(3)),
            Row::new("Archive", Some(4)),
        ])
    }

    #[test]
    fn test_filter_eq_and_ne() {
        let set = rows();
        let hit = set.filter_by("title", &Predicate::eq("Printers")).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit.first().unwrap().title, "Printers");

        let rest = set.filter_by("title", &Predicate::ne("Printers")).unwrap();
        assert_eq!(rest.len(), 3);
    }

    #[test]
    fn test_filter_comparison_preserves_order() {
        let set = rows();
        let low = set.filter_by("priority", &Predicate::le(2)).unwrap();
        let titles: Vec<&str> = low.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Urgent problems", "Printers"]);
    }

    #[test]
    fn test_filter_non_coercible_comparison_excludes() {
        let mut items = rows().into_items();
        items.push(Row::new("No priority", None));
        let set = ResultSet::new(items);
        let low = set.filter_by("priority", &Predicate::le(2)).unwrap();
        assert_eq!(low.len(), 2);
    }

    #[test]
    fn test_filter_regex_with_flags() {
        let set = rows();
        let hit = set
            .filter_by("title", &Predicate::matches("/printer/i"))
            .unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit.first().unwrap().title, "Printers");
    }

    #[test]
    fn test_filter_malformed_regex_is_validation_error() {
        let set = rows();
        let err = set
            .filter_by("title", &Predicate::matches("printer"))
            .unwrap_err();
        assert!(err.is_validation());
        let err = set
            .filter_by("title", &Predicate::matches("/print(er/"))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_filter_membership() {
        let set = rows();
        let hit = set
            .filter_by("title", &Predicate::one_of(["General", "Archive"]))
            .unwrap();
        assert_eq!(hit.len(), 2);
        let rest = set
            .filter_by("title", &Predicate::none_of(["General", "Archive"]))
            .unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn test_filter_list_valued_field_is_membership() {
        let mut a = Row::new("A", None);
        a.group_ids = vec![1, 2];
        let mut b = Row::new("B", None);
        b.group_ids = vec![3];
        let set = ResultSet::new(vec![a, b]);
        let hit = set.filter_by("group_ids", &Predicate::eq(2)).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit.first().unwrap().title, "A");
    }

    #[test]
    fn test_filter_undeclared_field_rejected() {
        let set = rows();
        let err = set.filter_by("nope", &Predicate::eq(1)).unwrap_err();
        assert!(err.is_unsupported());
        // declared but not marked filterable
        let err = set.filter_by("hidden", &Predicate::eq(1)).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_independent_filters_commute() {
        let mut items = rows().into_items();
        items[0].flagged = true;
        items[2].flagged = true;
        let set = ResultSet::new(items);

        let priority = Predicate::le(3);
        let flagged = Predicate::eq(true);
        let ab = set
            .filter_by("priority", &priority)
            .unwrap()
            .filter_by("flagged", &flagged)
            .unwrap();
        let ba = set
            .filter_by("flagged", &flagged)
            .unwrap()
            .filter_by("priority", &priority)
            .unwrap();
        let titles_ab: Vec<&str> = ab.iter().map(|r| r.title.as_str()).collect();
        let titles_ba: Vec<&str> = ba.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles_ab, titles_ba);
        assert_eq!(titles_ab, vec!["Urgent problems", "General"]);
    }

    #[test]
    fn test_order_by_stable_nulls_last() {
        let set = ResultSet::new(vec![
            Row::new("b", Some(2)),
            Row::new("missing", None),
            Row::new("a1", Some(1)),
            Row::new("a2", Some(1)),
        ]);
        let asc = set.order_by("priority", Direction::Ascending).unwrap();
        let titles: Vec<&str> = asc.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a2", "b", "missing"]);

        let desc = set.order_by("priority", Direction::Descending).unwrap();
        let titles: Vec<&str> = desc.iter().map(|r| r.title.as_str()).collect();
        // ties keep prior order, absent values still last
        assert_eq!(titles, vec!["b", "a1", "a2", "missing"]);
    }

    #[test]
    fn test_order_by_string() {
        let set = rows();
        let sorted = set.order_by("title", Direction::Ascending).unwrap();
        let titles: Vec<&str> = sorted.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Archive", "General", "Printers", "Urgent problems"]);
        // source container untouched
        assert_eq!(set.first().unwrap().title, "Urgent problems");
    }

    #[test]
    fn test_get_page() {
        let items: Vec<Row> = (1..=25)
            .map(|i| Row::new(&format!("r{}", i), Some(i)))
            .collect();
        let set = ResultSet::new(items);

        let page2 = set.get_page(2, 10);
        assert_eq!(page2.len(), 10);
        assert_eq!(page2.first().unwrap().priority, Some(11));
        assert_eq!(page2.get(9).unwrap().priority, Some(20));

        let page3 = set.get_page(3, 10);
        assert_eq!(page3.len(), 5);
        assert_eq!(page3.get(4).unwrap().priority, Some(25));

        assert!(set.get_page(4, 10).is_empty());
        assert!(set.get_page(0, 10).is_empty());
    }

    #[test]
    fn test_first_and_iteration() {
        let set = rows();
        assert_eq!(set.first().unwrap().title, "Urgent problems");
        assert_eq!(set.iter().count(), 4);
        let empty: ResultSet<Row> = ResultSet::new(Vec::new());
        assert!(empty.first().is_none());
    }
}
