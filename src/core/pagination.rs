//! Pagination engine
//!
//! Reads a transaction feed page by page until one of these holds, checked in
//! this order after every page:
//!
//! 1. the accumulated count reached the cap (the result is truncated to it)
//! 2. the page was shorter than the nominal page size, or the server said
//!    there is nothing left
//! 3. the page was empty
//!
//! A page answered with a non-success status aborts the whole run; records
//! gathered from earlier pages are dropped.

use crate::core::session::Session;
use crate::transport::ApiRequest;
use crate::types::{BankError, Operation, OperationSelector};
use chrono::{Datelike, Days, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use serde_json::Value;
use std::time::Duration;

/// Cap used when the caller does not give one
pub const DEFAULT_MAX_COUNT: usize = 100;

/// Length of the default date window, in days
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

const OPERATIONS_PATH: &str =
    "particulier/operations/synthese/detail-comptes/jcr:content.n3.operations.json";
const DEFERRED_PATH: &str = "particulier/operations/synthese/detail-comptes/jcr:content.n3.operations.encours.carte.debit.differe.json";

/// Offset of Paris standard time, in seconds
const PARIS_WINTER_OFFSET: i32 = 3600;

/// Offset of Paris summer time, in seconds
const PARIS_SUMMER_OFFSET: i32 = 7200;

/// Inclusive date window of an account feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub stop: NaiveDate,
}

impl DateWindow {
    /// Fill in the bounds the caller left out
    ///
    /// A missing stop is `today`; a missing start is 30 days before the stop.
    ///
    /// # Errors
    ///
    /// A configuration error when the start falls after the stop, or when the
    /// default start cannot be represented.
    pub fn resolve(
        start: Option<NaiveDate>,
        stop: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, BankError> {
        let stop = stop.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => stop
                .checked_sub_signed(TimeDelta::days(DEFAULT_WINDOW_DAYS))
                .ok_or_else(|| {
                    BankError::config(format!("no date {} days before {}", DEFAULT_WINDOW_DAYS, stop))
                })?,
        };
        if start > stop {
            return Err(BankError::config(format!(
                "date window starts after it ends ({} > {})",
                start, stop
            )));
        }
        Ok(Self { start, stop })
    }

    /// `[today - 30 days, today]`
    pub fn last_days(today: NaiveDate) -> Result<Self, BankError> {
        Self::resolve(None, None, today)
    }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let last_day = NaiveDate::from_ymd_opt(year, month, 31)?;
    last_day.checked_sub_days(Days::new(last_day.weekday().num_days_from_sunday().into()))
}

/// Paris offset in force at midnight of `date`
///
/// Summer time runs from the last Sunday of March to the last Sunday of
/// October. Both switches happen in the small hours, so each of those Sundays
/// starts on the offset of the day before.
pub fn bank_offset(date: NaiveDate) -> Option<FixedOffset> {
    let summer_start = last_sunday(date.year(), 3)?;
    let summer_end = last_sunday(date.year(), 10)?;
    let seconds = if summer_start < date && date <= summer_end {
        PARIS_SUMMER_OFFSET
    } else {
        PARIS_WINTER_OFFSET
    };
    FixedOffset::east_opt(seconds)
}

/// Current date in Paris
pub fn bank_today() -> NaiveDate {
    let now = Utc::now().naive_utc();
    bank_offset(now.date())
        .and_then(|offset| now.checked_add_signed(TimeDelta::seconds(offset.local_minus_utc().into())))
        .unwrap_or(now)
        .date()
}

/// Epoch milliseconds at midnight of `date` in Paris, where the bank stamps
/// its operations
fn epoch_millis(date: NaiveDate) -> Result<i64, BankError> {
    bank_offset(date)
        .and_then(|offset| {
            offset
                .from_local_datetime(&date.and_time(NaiveTime::MIN))
                .single()
        })
        .map(|midnight| midnight.timestamp_millis())
        .ok_or_else(|| BankError::config(format!("no Paris midnight on {}", date)))
}

/// Parameters of one pagination run
#[derive(Debug, Clone, PartialEq)]
pub struct OperationsQuery {
    pub selector: OperationSelector,
    pub date_start: Option<NaiveDate>,
    pub date_stop: Option<NaiveDate>,
    pub max_count: usize,
    pub page_delay: Option<Duration>,
}

impl OperationsQuery {
    /// Query with the default cap, window and no delay
    pub fn new(selector: OperationSelector) -> Self {
        Self {
            selector,
            date_start: None,
            date_stop: None,
            max_count: DEFAULT_MAX_COUNT,
            page_delay: None,
        }
    }

    pub fn dates(mut self, start: Option<NaiveDate>, stop: Option<NaiveDate>) -> Self {
        self.date_start = start;
        self.date_stop = stop;
        self
    }

    pub fn max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn page_delay(mut self, delay: Option<Duration>) -> Self {
        self.page_delay = delay;
        self
    }
}

/// One decoded page of a feed
#[derive(Debug, Clone, PartialEq)]
pub struct OperationsPage {
    pub operations: Vec<Operation>,
    /// Explicit `hasNext` flag, when the envelope carries one
    pub has_next: Option<bool>,
    /// Server cursor for the next page (`nextSetStartIndex`)
    pub next_start: Option<String>,
}

/// Decode a page body
///
/// The feed answers either with a bare array of records or with an envelope
/// `{ "listeOperations": [...], "hasNext": bool, "nextSetStartIndex": ... }`.
pub fn decode_page(body: &str) -> Result<OperationsPage, BankError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| BankError::parse("operations page", e))?;

    match value {
        Value::Array(_) => Ok(OperationsPage {
            operations: decode_operations(value)?,
            has_next: None,
            next_start: None,
        }),
        Value::Object(mut envelope) => {
            let records = envelope.remove("listeOperations").ok_or_else(|| {
                BankError::parse("operations page", "missing field `listeOperations`")
            })?;
            let has_next = envelope.get("hasNext").and_then(Value::as_bool);
            let next_start = match envelope.get("nextSetStartIndex") {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            Ok(OperationsPage {
                operations: decode_operations(records)?,
                has_next,
                next_start,
            })
        }
        other => Err(BankError::parse(
            "operations page",
            format!("expected an array or an object, got {}", other),
        )),
    }
}

fn decode_operations(records: Value) -> Result<Vec<Operation>, BankError> {
    serde_json::from_value(records).map_err(|e| BankError::parse("operations page", e))
}

/// Position in the feed, owned by a single run
#[derive(Debug, Default)]
struct PageCursor {
    page: usize,
    offset: usize,
    next_start: Option<String>,
}

impl PageCursor {
    fn advance(&mut self, received: usize, next_start: Option<String>) {
        self.page += 1;
        self.offset += received;
        self.next_start = next_start;
    }

    /// `startIndex` for the next request; absent on the first page
    fn start_index(&self) -> Option<String> {
        if self.page == 0 {
            return None;
        }
        Some(
            self.next_start
                .clone()
                .unwrap_or_else(|| self.offset.to_string()),
        )
    }
}

/// Reads transaction feeds through an authenticated session
pub struct PaginationEngine<'a> {
    session: &'a Session,
    page_size: usize,
}

impl<'a> PaginationEngine<'a> {
    /// Engine using the session's nominal page size
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            page_size: session.page_size(),
        }
    }

    /// Override the nominal page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch the operations selected by `query`, in server order
    ///
    /// # Returns
    ///
    /// At most `query.max_count` operations; fewer when the feed runs dry.
    ///
    /// # Errors
    ///
    /// `OperationsFetch` with the status and body of the first page that was
    /// not answered with success.
    pub async fn fetch(&self, query: &OperationsQuery) -> Result<Vec<Operation>, BankError> {
        let window = DateWindow::resolve(
            query.date_start,
            query.date_stop,
            bank_today(),
        )?;
        if query.max_count == 0 {
            return Ok(Vec::new());
        }

        let mut cursor = PageCursor::default();
        let mut operations: Vec<Operation> = Vec::new();

        loop {
            let request = self.page_request(&query.selector, &window, &cursor)?;
            tracing::debug!(
                page = cursor.page + 1,
                offset = cursor.offset,
                fixture = %request.fixture,
                "fetching operations page"
            );

            let response = self.session.send(request).await?;
            if !response.is_success() {
                return Err(BankError::OperationsFetch {
                    status: response.status,
                    body: response.body,
                });
            }

            let page = decode_page(&response.body)?;
            let received = page.operations.len();
            operations.extend(page.operations);

            if operations.len() >= query.max_count {
                operations.truncate(query.max_count);
                break;
            }
            if received < self.page_size || page.has_next == Some(false) {
                break;
            }
            if received == 0 {
                break;
            }

            cursor.advance(received, page.next_start);
            if let Some(delay) = query.page_delay {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::debug!(
            count = operations.len(),
            pages = cursor.page + 1,
            "operations fetched"
        );
        Ok(operations)
    }

    fn page_request(
        &self,
        selector: &OperationSelector,
        window: &DateWindow,
        cursor: &PageCursor,
    ) -> Result<ApiRequest, BankError> {
        let fixture = format!("{}-p{}", selector.fixture_base(), cursor.page + 1);

        let request = match selector {
            OperationSelector::Account {
                account_index,
                family_code,
            } => self
                .session
                .get(OPERATIONS_PATH, fixture)?
                .query("grandeFamilleCode", family_code)
                .query("compteIdx", account_index)
                .query("idDevise", "EUR")
                .query("dateDebut", epoch_millis(window.start)?)
                .query("dateFin", epoch_millis(window.stop)?),
            OperationSelector::DeferredCard {
                account_index,
                family_code,
                card_index,
            } => self
                .session
                .get(DEFERRED_PATH, fixture)?
                .query("grandeFamilleCode", family_code)
                .query("compteIdx", account_index)
                .query("carteIdx", card_index),
        };

        let request = request.query("count", self.page_size);
        Ok(match cursor.start_index() {
            Some(start) => request.query("startIndex", start),
            None => request,
        })
    }
}
