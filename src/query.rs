//! Filtering, keyword search, ordering and pagination over a question collection.
//!
//! Everything here is a pure function of its arguments: the input slice is only
//! borrowed, nothing is logged, and a given `(collection, spec)` pair always
//! produces the same result.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::models::{CategorySet, Difficulty, Question};

/// QueryError
///
/// Caller mistakes in a `QuerySpec`. None of these are retryable: the query has
/// to be corrected before it is submitted again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid query spec: {0}")]
    InvalidQuerySpec(String),
}

/// SortOrder
///
/// The orderings a listing can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Latest,
    /// Oldest first.
    Oldest,
    /// Most upvoted first, newest first among equal counts.
    Upvotes,
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(SortOrder::Latest),
            "oldest" => Ok(SortOrder::Oldest),
            "upvotes" => Ok(SortOrder::Upvotes),
            other => Err(QueryError::InvalidQuerySpec(format!(
                "unrecognized sort '{}', expected one of latest, oldest, upvotes",
                other
            ))),
        }
    }
}

impl SortOrder {
    fn compare(&self, a: &Question, b: &Question) -> Ordering {
        match self {
            SortOrder::Latest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
            SortOrder::Upvotes => b
                .upvotes
                .cmp(&a.upvotes)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }

    /// Stable, so records with equal keys keep their insertion order.
    fn sort(&self, questions: &mut [&Question]) {
        questions.sort_by(|a, b| self.compare(a, b));
    }
}

/// QuerySpec
///
/// The filter, sort and pagination parameters accepted by `GET /questions`.
/// Every field is optional. Empty values are read as absent, so a form that
/// submits `company=` does not constrain anything. Non-empty text filters are
/// compared as given, without trimming.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuerySpec {
    /// Exact company match.
    pub company: Option<String>,
    /// Exact topic match.
    pub topic: Option<String>,
    /// Exact role match.
    pub role: Option<String>,
    /// Exact difficulty match.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive substring tested against text, company and topic.
    #[serde(alias = "q")]
    pub keyword: Option<String>,
    /// One of `latest` (default), `oldest`, `upvotes`.
    pub sort: Option<String>,
    /// 1-indexed page number. Pagination applies only with `page_size` too.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, alias = "pageSize", alias = "limit", deserialize_with = "empty_string_as_none")]
    pub page_size: Option<i64>,
    /// Inclusive lower bound on `created_at`. RFC 3339, or `YYYY-MM-DD` for the
    /// start of that day (UTC).
    #[serde(default, alias = "fromDate", deserialize_with = "start_of_day_bound")]
    pub from_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`. RFC 3339, or `YYYY-MM-DD` for the
    /// end of that day (UTC).
    #[serde(default, alias = "toDate", deserialize_with = "end_of_day_bound")]
    pub to_date: Option<DateTime<Utc>>,
}

impl QuerySpec {
    pub fn sort_order(&self) -> Result<SortOrder, QueryError> {
        match non_empty(&self.sort) {
            Some(s) => s.parse(),
            None => Ok(SortOrder::default()),
        }
    }

    /// Returns `(offset, len)` when both page parameters are present.
    fn page_window(&self) -> Result<Option<(usize, usize)>, QueryError> {
        let (Some(page), Some(page_size)) = (self.page, self.page_size) else {
            return Ok(None);
        };
        if page <= 0 {
            return Err(QueryError::InvalidQuerySpec(format!(
                "page must be positive, got {}",
                page
            )));
        }
        if page_size <= 0 {
            return Err(QueryError::InvalidQuerySpec(format!(
                "page_size must be positive, got {}",
                page_size
            )));
        }
        let offset = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
        let len = usize::try_from(page_size).unwrap_or(usize::MAX);
        Ok(Some((offset, len)))
    }
}

/// QueryResult
///
/// One page (or all) of the matching questions, plus the number that matched
/// before pagination so callers can work out how many pages exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct QueryResult {
    pub items: Vec<Question>,
    pub total_matched: usize,
}

/// query
///
/// Runs `spec` against `questions`: equality filters, then the keyword filter,
/// then the date range, then the requested ordering, then the page slice.
/// A page past the end yields an empty `items`, not an error.
pub fn query(questions: &[Question], spec: &QuerySpec) -> Result<QueryResult, QueryError> {
    let order = spec.sort_order()?;
    let window = spec.page_window()?;
    let keyword = non_empty(&spec.keyword).map(str::to_lowercase);

    let mut matched: Vec<&Question> = questions
        .iter()
        .filter(|q| matches_tags(q, spec))
        .filter(|q| keyword.as_deref().is_none_or(|k| matches_keyword(q, k)))
        .filter(|q| within_dates(q, spec.from_date, spec.to_date))
        .collect();

    order.sort(&mut matched);
    let total_matched = matched.len();

    let items = match window {
        Some((offset, len)) => matched.into_iter().skip(offset).take(len).cloned().collect(),
        None => matched.into_iter().cloned().collect(),
    };

    Ok(QueryResult {
        items,
        total_matched,
    })
}

/// categories
///
/// Derives the distinct companies, topics and roles present in `questions`.
/// Each list is sorted, so the output does not depend on input order.
pub fn categories(questions: &[Question]) -> CategorySet {
    let mut companies = BTreeSet::new();
    let mut topics = BTreeSet::new();
    let mut roles = BTreeSet::new();

    for q in questions {
        companies.insert(q.company.clone());
        topics.insert(q.topic.clone());
        roles.insert(q.role.clone());
    }

    CategorySet {
        companies: companies.into_iter().collect(),
        topics: topics.into_iter().collect(),
        roles: roles.into_iter().collect(),
    }
}

fn matches_tags(q: &Question, spec: &QuerySpec) -> bool {
    let tag_ok = |filter: &Option<String>, value: &str| non_empty(filter).is_none_or(|f| f == value);

    tag_ok(&spec.company, &q.company)
        && tag_ok(&spec.topic, &q.topic)
        && tag_ok(&spec.role, &q.role)
        && spec.difficulty.is_none_or(|d| d == q.difficulty)
}

// `keyword` is already lowercased.
fn matches_keyword(q: &Question, keyword: &str) -> bool {
    [&q.text, &q.company, &q.topic]
        .iter()
        .any(|field| field.to_lowercase().contains(keyword))
}

fn within_dates(q: &Question, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> bool {
    from.is_none_or(|from| q.created_at >= from) && to.is_none_or(|to| q.created_at <= to)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Treats a missing or blank query parameter as `None` and parses anything else.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

fn start_of_day_bound<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    date_bound(deserializer, false)
}

fn end_of_day_bound<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    date_bound(deserializer, true)
}

/// Reads a date filter. A full timestamp is taken as is; a bare date widens to
/// the first or last instant of that UTC day so the bound stays inclusive.
fn date_bound<'de, D>(deserializer: D, end_of_day: bool) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(s) = raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(instant) = s.parse::<DateTime<Utc>>() {
        return Ok(Some(instant));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        de::Error::custom(format!(
            "'{}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date",
            s
        ))
    })?;
    let bound = if end_of_day {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };

    bound
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| de::Error::custom(format!("'{}' has no valid time of day", s)))
}
