//! Data monitoring panel.
//!
//! Two query modes share one paginated record table:
//!
//! - **latest**: batches of the newest records, addressed by id window
//!   (see [`crate::pagination::record_window`]);
//! - **range**: operator filters on ids and/or timestamps, sliced with
//!   limit/offset.
//!
//! Every fetch reads the record count fresh before asking for a slice. The
//! two requests are not atomic; records inserted between them can shift the
//! window by that many ids, which is tolerated since the backend stays the
//! source of truth.

use serde::Serialize;

use crate::client::CloudClient;
use crate::error::{CoreError, PageError};
use crate::pagination::{self, IdWindow};
use crate::protocol::query::RangeQuery;
use crate::types::{Record, RegisterSnapshot};

use super::{banner, error_banner, StatusMessage};

/// Which query fills the record table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "query", rename_all = "lowercase")]
pub enum QueryMode {
    Latest,
    Range(RangeQuery),
}

/// Snapshot of the record table after a fetch.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    #[serde(flatten)]
    pub mode: QueryMode,
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<IdWindow>,
    pub records: Vec<Record>,
}

/// Everything a latest-mode fetch loads before it is committed.
struct LatestPage {
    registers: RegisterSnapshot,
    total_count: u64,
    window: Option<IdWindow>,
    records: Vec<Record>,
}

/// State behind the data monitoring view.
pub struct DataMonitor {
    client: CloudClient,
    page_size: u64,
    mode: QueryMode,
    registers: RegisterSnapshot,
    records: Vec<Record>,
    total_count: u64,
    current_page: u64,
    window: Option<IdWindow>,
    message: Option<StatusMessage>,
}

impl DataMonitor {
    /// Create an empty monitor. Nothing is fetched until an action runs.
    pub fn new(client: CloudClient, page_size: u64) -> Result<Self, PageError> {
        if page_size == 0 {
            return Err(PageError::ZeroPageSize);
        }
        Ok(Self {
            client,
            page_size,
            mode: QueryMode::Latest,
            registers: RegisterSnapshot::empty(),
            records: Vec::new(),
            total_count: 0,
            current_page: 0,
            window: None,
            message: None,
        })
    }

    /// Create a monitor and load the newest batch, as the view does when it
    /// is first shown. A failed initial load is reported through
    /// [`DataMonitor::message`].
    pub async fn open(client: CloudClient, page_size: u64) -> Result<Self, PageError> {
        let mut monitor = Self::new(client, page_size)?;
        if let Err(e) = monitor.fetch_latest(1).await {
            tracing::debug!(error = %e, "initial load failed; monitor opened empty");
        }
        Ok(monitor)
    }

    // ==================== Accessors ====================

    pub fn mode(&self) -> &QueryMode {
        &self.mode
    }

    pub fn registers(&self) -> &RegisterSnapshot {
        &self.registers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn total_pages(&self) -> u64 {
        pagination::total_pages(self.total_count, self.page_size)
    }

    pub fn window(&self) -> Option<IdWindow> {
        self.window
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn view(&self) -> PageView {
        PageView {
            mode: self.mode.clone(),
            page: self.current_page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages(),
            window: self.window,
            records: self.records.clone(),
        }
    }

    // ==================== Latest mode ====================

    /// Refresh only the register snapshot.
    pub async fn refresh_registers(&mut self) -> Result<&RegisterSnapshot, CoreError> {
        let result = self
            .client
            .latest_registers()
            .await
            .map_err(CoreError::from);
        self.message = Some(banner(&result, "refresh registers", |s| {
            format!("{} of {} registers reporting", s.populated(), s.slots().len())
        }));
        self.registers = result?;
        Ok(&self.registers)
    }

    /// Load batch `batch` (1 = newest) together with the register snapshot.
    pub async fn fetch_latest(&mut self, batch: u64) -> Result<PageView, CoreError> {
        let result = self.load_latest(batch).await;
        self.message = Some(banner(&result, "fetch latest", |page| match page.window {
            Some(w) => format!(
                "Showing records {} to {} of {}",
                w.start_id, w.end_id, page.total_count
            ),
            None => "No records available".to_string(),
        }));

        let page = result?;
        self.mode = QueryMode::Latest;
        self.registers = page.registers;
        self.records = page.records;
        self.total_count = page.total_count;
        self.window = page.window;
        self.current_page = batch;
        Ok(self.view())
    }

    async fn load_latest(&self, batch: u64) -> Result<LatestPage, CoreError> {
        if batch == 0 {
            return Err(PageError::ZeroPage.into());
        }

        let registers = self.client.latest_registers().await?;
        let total_count = self.client.record_count(&RangeQuery::new()).await?;

        let window = pagination::record_window(total_count, batch, self.page_size)?;
        let records = match window {
            None if total_count == 0 => Vec::new(),
            None => {
                return Err(PageError::BeyondHistory {
                    batch,
                    total: total_count,
                }
                .into())
            }
            Some(w) => {
                let mut records = self.client.records(&RangeQuery::for_window(w)).await?;
                records.sort_by(|a, b| b.id.cmp(&a.id));
                records
            }
        };

        tracing::info!(batch, total_count, ?window, fetched = records.len(), "latest batch loaded");

        Ok(LatestPage {
            registers,
            total_count,
            window,
            records,
        })
    }

    /// Step to the next older batch.
    pub async fn older(&mut self) -> Result<PageView, CoreError> {
        if !self.in_latest_mode() {
            return self.reject(PageError::NoActiveQuery);
        }
        if !pagination::has_older(self.total_count, self.current_page, self.page_size) {
            return self.reject(PageError::BeyondHistory {
                batch: self.current_page + 1,
                total: self.total_count,
            });
        }
        self.fetch_latest(self.current_page + 1).await
    }

    /// Step back toward the newest batch.
    pub async fn newer(&mut self) -> Result<PageView, CoreError> {
        if !self.in_latest_mode() {
            return self.reject(PageError::NoActiveQuery);
        }
        if self.current_page <= 1 {
            return self.reject(PageError::AlreadyNewest);
        }
        self.fetch_latest(self.current_page - 1).await
    }

    // ==================== Range mode ====================

    /// Run a filtered query and show page `page` of its results.
    ///
    /// The returned records replace whatever the table showed before.
    pub async fn fetch_range(&mut self, query: RangeQuery, page: u64) -> Result<PageView, CoreError> {
        let result = self.load_range(&query, page).await;
        self.message = Some(banner(&result, "fetch range", |(total, records)| {
            format!("Retrieved {} of {} records", records.len(), total)
        }));

        let (total_count, records) = result?;
        self.mode = QueryMode::Range(query);
        self.records = records;
        self.total_count = total_count;
        self.window = None;
        self.current_page = page;
        Ok(self.view())
    }

    async fn load_range(&self, query: &RangeQuery, page: u64) -> Result<(u64, Vec<Record>), CoreError> {
        let offset = pagination::page_offset(page, self.page_size)?;
        query.validate()?;

        let total_count = self.client.record_count(query).await?;
        let records = self
            .client
            .records_page(query, self.page_size, offset)
            .await?;

        tracing::info!(page, offset, total_count, fetched = records.len(), "range page loaded");
        Ok((total_count, records))
    }

    /// Next page of the active range query.
    pub async fn next_page(&mut self) -> Result<PageView, CoreError> {
        let QueryMode::Range(query) = self.mode.clone() else {
            return self.reject(PageError::NoActiveQuery);
        };
        if self.current_page >= self.total_pages() {
            return self.reject(PageError::BeyondHistory {
                batch: self.current_page + 1,
                total: self.total_count,
            });
        }
        self.fetch_range(query, self.current_page + 1).await
    }

    /// Previous page of the active range query.
    pub async fn prev_page(&mut self) -> Result<PageView, CoreError> {
        let QueryMode::Range(query) = self.mode.clone() else {
            return self.reject(PageError::NoActiveQuery);
        };
        if self.current_page <= 1 {
            return self.reject(PageError::AlreadyFirst);
        }
        self.fetch_range(query, self.current_page - 1).await
    }

    /// Jump to `page` in whichever mode is active.
    pub async fn goto(&mut self, page: u64) -> Result<PageView, CoreError> {
        match self.mode.clone() {
            QueryMode::Latest => self.fetch_latest(page).await,
            QueryMode::Range(query) => self.fetch_range(query, page).await,
        }
    }

    fn in_latest_mode(&self) -> bool {
        self.mode == QueryMode::Latest && self.current_page > 0
    }

    fn reject(&mut self, err: PageError) -> Result<PageView, CoreError> {
        let err = CoreError::from(err);
        self.message = Some(error_banner(&err, "navigate"));
        Err(err)
    }
}
