/*
[INPUT]:  Successive GET pages and their CB-AFTER headers
[OUTPUT]: One aggregated collection carrying the last page's metadata
[POS]:    HTTP layer - cursor pagination shared by both clients
[UPDATE]: When the continuation rule or cursor header changes
*/

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{ApiResponse, NormalizedResponse, Params, Payload};

/// Page size injected when the caller does not set `limit`
pub const DEFAULT_PAGE_LIMIT: u64 = 100;
/// Response header naming the next cursor
pub const CURSOR_HEADER: &str = "CB-AFTER";
/// Request parameter the cursor is echoed back in
pub const CURSOR_PARAM: &str = "after";

/// What to do after absorbing a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageStep {
    Next(String),
    Done,
}

/// Accumulates pages for one paginated call
///
/// A page exactly as long as the limit is taken as "maybe more", so an
/// exactly full last page costs one extra request that returns nothing.
#[derive(Debug)]
pub(crate) struct Pager {
    limit: u64,
    items: Vec<Value>,
    pages: usize,
    passthrough: Option<Payload>,
}

impl Pager {
    /// Inject the default limit and remember the effective one
    pub(crate) fn start(params: &mut Params) -> Self {
        params.set_default("limit", DEFAULT_PAGE_LIMIT);
        let limit = params
            .get("limit")
            .and_then(|value| match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        Self {
            limit,
            items: Vec::new(),
            pages: 0,
            passthrough: None,
        }
    }

    pub(crate) fn absorb(&mut self, payload: Payload, response: &NormalizedResponse) -> PageStep {
        let page = match payload {
            Payload::Json(Value::Array(page)) => page,
            other => {
                // A first page that is not a list is handed back untouched
                if self.pages == 0 {
                    self.passthrough = Some(other);
                }
                return PageStep::Done;
            }
        };

        self.pages += 1;
        let full = self.limit > 0 && page.len() as u64 == self.limit;
        self.items.extend(page);
        if !full {
            return PageStep::Done;
        }

        match response.header(CURSOR_HEADER) {
            Some(cursor) => {
                debug!(page = self.pages, cursor, "full page, fetching next");
                PageStep::Next(cursor.to_string())
            }
            None => {
                warn!(page = self.pages, "full page without {CURSOR_HEADER} header, stopping");
                PageStep::Done
            }
        }
    }

    /// Aggregated result; `last` is the response of the final page
    pub(crate) fn finish(self, last: NormalizedResponse) -> ApiResponse<Payload> {
        let data = self
            .passthrough
            .unwrap_or(Payload::Json(Value::Array(self.items)));
        ApiResponse::new(data, last)
    }
}
