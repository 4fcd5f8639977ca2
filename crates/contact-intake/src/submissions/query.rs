use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::cursor::ScanCursor;
use super::domain::Submission;
use super::error::SubmissionError;
use super::store::{ScanFilter, StoreError, SubmissionStore};

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Listing parameters exactly as they arrive on the query string. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionQuery {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub last_evaluated_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPage {
    pub submissions: Vec<Submission>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub next_token: String,
}

/// Filtered, paginated listing over a full table scan.
pub struct QueryService<S> {
    store: Arc<S>,
}

impl<S> QueryService<S>
where
    S: SubmissionStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self, query: SubmissionQuery) -> Result<SubmissionPage, SubmissionError> {
        let limit = parse_limit(present(query.limit).as_deref())?;
        let start_after = present(query.last_evaluated_key)
            .map(|token| ScanCursor::decode(&token))
            .transpose()?
            .map(ScanCursor::into_key);

        let filter = ScanFilter {
            status: present(query.status),
            start_date: present(query.start_date),
            end_date: present(query.end_date),
        };

        let page = self
            .store
            .scan(&filter, limit, start_after.as_ref())
            .map_err(|err| {
                error!(error = %err, "failed to scan submissions");
                SubmissionError::from(err)
            })?;

        debug!(
            returned = page.items.len(),
            more = page.last_key.is_some(),
            "submission page scanned"
        );

        let pagination = page
            .last_key
            .map(|key| ScanCursor::from(&key).encode())
            .transpose()
            .map_err(|err| {
                error!(error = %err, "failed to encode pagination token");
                SubmissionError::Store(StoreError::Serialization(err))
            })?
            .map(|next_token| Pagination { next_token });

        Ok(SubmissionPage {
            submissions: page.items,
            pagination,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_limit(raw: Option<&str>) -> Result<usize, SubmissionError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PAGE_LIMIT);
    };

    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(SubmissionError::InvalidLimit(raw.to_string())),
        Ok(limit) => Ok(limit.min(MAX_PAGE_LIMIT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(parse_limit(None).expect("default"), DEFAULT_PAGE_LIMIT);
        assert_eq!(parse_limit(Some("2")).expect("explicit"), 2);
        assert_eq!(parse_limit(Some("50000")).expect("clamped"), MAX_PAGE_LIMIT);
    }

    #[test]
    fn limit_rejects_zero_and_garbage() {
        for raw in ["0", "-1", "ten", "1.5"] {
            assert!(matches!(
                parse_limit(Some(raw)),
                Err(SubmissionError::InvalidLimit(value)) if value == raw
            ));
        }
    }
}
