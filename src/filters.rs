// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! List filtering, sorting and pagination shared by every collection endpoint.
//!
//! Sort targets are only ever taken from a per-endpoint safelist of
//! `&'static str` column names, so the value interpolated into `ORDER BY`
//! never originates from the request.

use crate::error::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw pagination parameters as they arrive in the query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// A sort target resolved against a safelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: &'static str,
    pub descending: bool,
}

impl SortKey {
    /// Resolve `raw` (optionally prefixed with `-` for descending order)
    /// against `safelist`. Returns `None` for anything not listed.
    pub fn parse(raw: &str, safelist: &'static [&'static str]) -> Option<Self> {
        let (name, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        safelist
            .iter()
            .find(|&&column| column == name)
            .map(|&column| SortKey { column, descending })
    }

    pub fn direction(&self) -> &'static str {
        if self.descending {
            "DESC"
        } else {
            "ASC"
        }
    }
}

/// Validated list filters.
#[derive(Debug, Clone, Validate)]
pub struct Filters {
    #[validate(range(min = 1, max = 10_000_000, message = "must be between 1 and 10 million"))]
    pub page: i64,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub page_size: i64,
    pub sort: SortKey,
}

impl Filters {
    /// Rows per page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Rows skipped before the current page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination metadata returned alongside every list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// Validate pagination and sort parameters for an endpoint.
///
/// An unset `sort` falls back to the first safelist entry.
pub fn parse_filters(
    params: &ListParams,
    safelist: &'static [&'static str],
) -> Result<Filters, AppError> {
    let mut errors = FieldErrors::new();

    let page = read_int(params.page.as_deref(), DEFAULT_PAGE, "page", &mut errors);
    let page_size = read_int(
        params.page_size.as_deref(),
        DEFAULT_PAGE_SIZE,
        "page_size",
        &mut errors,
    );

    let raw_sort = params
        .sort
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| safelist.first().copied())
        .unwrap_or_default();
    let sort = SortKey::parse(raw_sort, safelist);
    if sort.is_none() {
        errors.insert("sort".to_string(), "invalid sort value".to_string());
    }

    match sort {
        Some(sort) if errors.is_empty() => {
            let filters = Filters {
                page,
                page_size,
                sort,
            };
            filters.validate()?;
            Ok(filters)
        }
        _ => Err(AppError::Validation(errors)),
    }
}

/// Compute pagination metadata from a total count. Pure arithmetic.
pub fn compute_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

/// Parse an optional integer query value, recording a field error on failure.
pub fn read_int(raw: Option<&str>, default: i64, field: &str, errors: &mut FieldErrors) -> i64 {
    match raw.filter(|s| !s.is_empty()) {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            errors.insert(field.to_string(), "must be an integer value".to_string());
            default
        }),
    }
}

/// Split a comma-separated query value into trimmed, non-empty items.
pub fn read_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
