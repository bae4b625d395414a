// Runs the pipeline per master sale: search, judge, price, persist; plus daily reconciliation
use crate::analyzer::lifecycle::{build_lifecycle_data, state_for_status, LifecycleIndicators};
use crate::analyzer::sale_list::{PlotRow, SaleRow};
use crate::analyzer::{AnalyzerImpl, PriceStats, SaleList, SimilarityChecker};
use crate::config::AppConfig;
use crate::model::{ConfigError, ListingStatus, PipelineError, ScraperError, StorageError};
use crate::nlp::TextAnalyzer;
use crate::parser::VirtualSalesParser;
use crate::registry::Label;
use crate::sale::{join_text, Sale, SaleSource, SaleState};
use crate::scraper::Marketplace;
use crate::search::SearchStrategy;
use crate::storage::{SqliteStorage, StatusChange};
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Outcome of one master's run.
#[derive(Debug, Clone, Default)]
pub struct MasterReport {
    pub sale_id: String,
    pub queries: usize,
    pub failed_queries: usize,
    pub network_failures: usize,
    pub inspected: usize,
    pub similar: usize,
    pub stats: Option<PriceStats>,
    pub outliers: usize,
    pub hard_outliers: usize,
    pub lifecycle: LifecycleIndicators,
    pub table: Vec<SaleRow>,
    pub plot: Vec<PlotRow>,
}

impl MasterReport {
    pub fn summary_line(&self) -> String {
        let suggested = self
            .stats
            .as_ref()
            .map(|s| format!("{:.0}", s.suggested_price))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{}: {}/{}; suggested={}; outliers={} ({} hard)",
            self.sale_id, self.similar, self.inspected, suggested, self.outliers, self.hard_outliers
        )
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub masters: Vec<MasterReport>,
    pub storage_failures: usize,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        let queries: usize = self.masters.iter().map(|m| m.queries).sum();
        let network: usize = self.masters.iter().map(|m| m.network_failures).sum();
        if self.storage_failures > 0 {
            4
        } else if queries > 0 && network == queries {
            3
        } else {
            0
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct StatusReport {
    pub checked: usize,
    pub touched: usize,
    pub new_versions: usize,
    pub state_changes: usize,
    pub relations_closed: usize,
    pub network_failures: usize,
    pub storage_failures: usize,
}

impl StatusReport {
    pub fn exit_code(&self) -> i32 {
        if self.storage_failures > 0 {
            4
        } else if self.checked > 0 && self.network_failures == self.checked {
            3
        } else {
            0
        }
    }
}

pub struct Orchestrator {
    config: Arc<AppConfig>,
    analyzer: Arc<TextAnalyzer>,
    storage: Arc<Mutex<SqliteStorage>>,
    marketplace: Arc<dyn Marketplace>,
    cancel: Arc<AtomicBool>,
    similarity: SimilarityChecker,
    pricing: AnalyzerImpl,
}

impl Orchestrator {
    pub fn new(
        config: Arc<AppConfig>,
        analyzer: Arc<TextAnalyzer>,
        storage: Arc<Mutex<SqliteStorage>>,
        marketplace: Arc<dyn Marketplace>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let similarity = SimilarityChecker::new(&config);
        let pricing = AnalyzerImpl::new(config.outlier.percentile);
        Self {
            config,
            analyzer,
            storage,
            marketplace,
            cancel,
            similarity,
            pricing,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn relevant(&self) -> &[Label] {
        &self.config.labels.similarity_relevant
    }

    fn per_query_timeout(&self) -> Duration {
        Duration::from_secs(self.config.http.per_query_timeout_s)
    }

    /// Masters from a virtual-sales file; they count as the operator's own sales.
    pub async fn run_file(&self, path: &Path, today: NaiveDate) -> Result<RunReport, PipelineError> {
        let metas = VirtualSalesParser::new()
            .read_file(path)
            .map_err(ConfigError::Io)?;
        let masters = metas
            .into_iter()
            .map(|mut meta| {
                meta.is_my_sale = true;
                let text = join_text(&meta.title, &meta.description);
                Sale::from_raw_text(&self.analyzer, SaleSource::File, &text, meta, today)
            })
            .collect();
        self.run_masters(masters, today).await
    }

    /// Masters by id: the stored version if known, otherwise read from the marketplace.
    pub async fn run_ids(&self, ids: &[String], today: NaiveDate) -> Result<RunReport, PipelineError> {
        let mut masters = Vec::new();
        for id in ids {
            let stored = self.storage.lock().await.current(id)?;
            if let Some(sale) = stored {
                masters.push(sale);
                continue;
            }
            match self.marketplace.fetch_listing(id, "").await {
                Ok(ListingStatus::Available(record)) => {
                    match Sale::from_marketplace_record(
                        &self.analyzer,
                        self.marketplace.source(),
                        &record,
                        today,
                    ) {
                        Ok(sale) => masters.push(sale),
                        Err(e) => warn!("{}: unusable listing: {}", id, e),
                    }
                }
                Ok(status) => warn!("{}: not available ({:?}), skipped", id, status),
                Err(e) => warn!("{}: fetch failed: {}", id, e),
            }
        }
        self.run_masters(masters, today).await
    }

    /// The operator's stored sales that are still on the market.
    pub async fn run_my_sales(&self, today: NaiveDate) -> Result<RunReport, PipelineError> {
        let masters = self.storage.lock().await.my_sales()?;
        info!("{} own sales to process", masters.len());
        self.run_masters(masters, today).await
    }

    /// One master at a time. A storage failure aborts only that master.
    pub async fn run_masters(&self, masters: Vec<Sale>, today: NaiveDate) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();
        for master in masters {
            let sale_id = master.sale_id.clone();
            match self.process_master(master, today).await {
                Ok(master_report) => {
                    println!("{}", master_report.summary_line());
                    report.masters.push(master_report);
                }
                Err(PipelineError::Storage(e)) => {
                    error!("{}: storage failure, master skipped: {}", sale_id, e);
                    report.storage_failures += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    async fn process_master(&self, mut master: Sale, today: NaiveDate) -> Result<MasterReport, PipelineError> {
        if self.cancelled() {
            return Err(PipelineError::Cancelled);
        }
        self.resolve_category(&mut master).await?;
        info!(
            "Processing master {} ({})",
            master.sale_id,
            master.product_category.map(|c| c.name()).unwrap_or("no category")
        );

        let strategy = SearchStrategy::new(self.analyzer.registry(), self.relevant());
        let queries = strategy.queries(&master);
        let mut report = MasterReport {
            sale_id: master.sale_id.clone(),
            queries: queries.len(),
            ..Default::default()
        };
        let mut list = SaleList::new(master.clone(), self.relevant());
        let mut inspected: HashSet<String> = HashSet::new();

        for api in &queries {
            if self.cancelled() {
                return Err(PipelineError::Cancelled);
            }
            let result = timeout(self.per_query_timeout(), self.marketplace.search(api))
                .await
                .unwrap_or_else(|_| Err(ScraperError::Timeout));
            let records = match result {
                Ok(records) => records,
                Err(e) => {
                    report.failed_queries += 1;
                    if e.is_transient() {
                        report.network_failures += 1;
                    }
                    warn!("{}: query '{}' failed: {}", master.sale_id, api.search_string, e);
                    continue;
                }
            };

            let candidates: Vec<Sale> = records
                .iter()
                .filter_map(|record| {
                    Sale::from_marketplace_record(
                        &self.analyzer,
                        self.marketplace.source(),
                        record,
                        today,
                    )
                    .map_err(|e| warn!("Skipping listing '{}': {}", record.id, e))
                    .ok()
                })
                .collect();
            for candidate in strategy.post_filter(api, candidates) {
                if candidate.sale_id == master.sale_id || !inspected.insert(candidate.sale_id.clone()) {
                    continue;
                }
                if !self.similarity.is_eligible(&master, &candidate) {
                    continue;
                }
                let verdict = self.similarity.check(&master, &candidate);
                if verdict.similar {
                    debug!(
                        "{} ~ {} (score {}, {})",
                        master.sale_id,
                        candidate.sale_id,
                        verdict.score,
                        verdict.label_key()
                    );
                    list.push(candidate);
                }
            }
        }
        report.inspected = inspected.len();
        report.similar = list.sales().len();
        report.stats = list.price_report(&self.pricing);
        report.outliers = list.outlier_count();
        report.hard_outliers = report.stats.as_ref().map_or(0, |s| list.hard_outlier_count(s));

        if self.cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let mut storage = self.storage.lock().await;
        storage.upsert_sale(&master, today)?;
        let mut linked: HashSet<String> = HashSet::new();
        for child in list.sales() {
            storage.upsert_child(&master.sale_id, child, today)?;
            linked.insert(child.sale_id.clone());
        }
        if report.failed_queries == 0 {
            let closed = storage.close_relations_not_in(&master.sale_id, &linked, today)?;
            if closed > 0 {
                info!("{}: closed {} relations", master.sale_id, closed);
            }
        }
        let children = storage.children_of(&master.sale_id)?;
        drop(storage);

        report.lifecycle = build_lifecycle_data(&children);
        report.table = list.table();
        report.plot = list.plot_rows();
        Ok(report)
    }

    /// Fills a missing category from the curated entity-category table,
    /// then from the registry's object placement.
    async fn resolve_category(&self, master: &mut Sale) -> Result<(), StorageError> {
        if master.product_category.is_some() {
            return Ok(());
        }
        let key = master.entity_list_key(self.relevant());
        if !key.is_empty() {
            let cached = self.storage.lock().await.entity_category(&key)?;
            if let Some((category, sub)) = cached {
                debug!("{}: category {} from entity table", master.sale_id, category);
                master.product_category = Some(category);
                master.product_sub_category = sub;
                return Ok(());
            }
        }
        for (object, _) in master.entities_in_order(&[Label::Object]) {
            if let Some((category, sub)) = self.analyzer.registry().category_for_object(&object) {
                master.product_category = Some(category);
                master.product_sub_category = sub;
                return Ok(());
            }
        }
        Ok(())
    }

    /// Re-reads every open marketplace sale. Fetches for one master's children
    /// run concurrently; their writes go to storage in one transaction.
    pub async fn check_status(&self, today: NaiveDate) -> Result<StatusReport, PipelineError> {
        let groups = {
            let storage = self.storage.lock().await;
            let mut groups: Vec<(String, Vec<Sale>)> = Vec::new();
            let mut covered: HashSet<String> = HashSet::new();
            for master_id in storage.master_ids()? {
                let children = storage.open_children(&master_id)?;
                covered.extend(children.iter().map(|s| s.sale_id.clone()));
                groups.push((master_id, children));
            }
            let rest: Vec<Sale> = storage
                .open_sales()?
                .into_iter()
                .filter(|s| !covered.contains(&s.sale_id))
                .collect();
            if !rest.is_empty() {
                groups.push((String::new(), rest));
            }
            groups
        };

        let mut report = StatusReport::default();
        for (master_id, sales) in groups {
            if self.cancelled() {
                return Err(PipelineError::Cancelled);
            }
            let sales: Vec<Sale> = sales
                .into_iter()
                .filter(|s| !matches!(s.source, SaleSource::File | SaleSource::Db))
                .collect();
            let results = join_all(sales.iter().map(|s| self.fetch_status(s))).await;

            let mut changes = Vec::new();
            for (sale, result) in sales.iter().zip(results) {
                report.checked += 1;
                match result {
                    Ok(ListingStatus::Available(record)) => {
                        match Sale::from_marketplace_record(&self.analyzer, sale.source, &record, today) {
                            Ok(mut fresh) => {
                                fresh.sale_id = sale.sale_id.clone();
                                fresh.is_my_sale = sale.is_my_sale;
                                fresh.is_outlier = sale.is_outlier;
                                // Listings carry no category; keep the resolved one.
                                if fresh.product_category.is_none() {
                                    fresh.product_category = sale.product_category;
                                    fresh.product_sub_category = sale.product_sub_category;
                                }
                                changes.push(StatusChange::Refresh(fresh));
                            }
                            Err(e) => warn!("{}: unusable listing: {}", sale.sale_id, e),
                        }
                    }
                    Ok(status) => {
                        if let Some(state) = state_for_status(&status) {
                            changes.push(StatusChange::State {
                                sale_id: sale.sale_id.clone(),
                                state,
                            });
                        }
                    }
                    Err(ScraperError::NotFound) => changes.push(StatusChange::State {
                        sale_id: sale.sale_id.clone(),
                        state: SaleState::Vanished,
                    }),
                    Err(e) if e.is_transient() => {
                        report.network_failures += 1;
                        warn!("{}: status check deferred: {}", sale.sale_id, e);
                    }
                    Err(e) => warn!("{}: status check failed: {}", sale.sale_id, e),
                }
            }

            let applied = self.storage.lock().await.apply_status_changes(&changes, today);
            match applied {
                Ok(summary) => {
                    report.touched += summary.touched;
                    report.new_versions += summary.new_versions;
                    report.state_changes += summary.state_changes;
                    report.relations_closed += summary.relations_closed;
                }
                Err(e) => {
                    error!("Reconciliation for master '{}' rolled back: {}", master_id, e);
                    report.storage_failures += 1;
                }
            }
        }
        Ok(report)
    }

    async fn fetch_status(&self, sale: &Sale) -> Result<ListingStatus, ScraperError> {
        timeout(
            self.per_query_timeout(),
            self.marketplace.fetch_listing(&sale.sale_id, &sale.href),
        )
        .await
        .unwrap_or_else(|_| Err(ScraperError::Timeout))
    }

    pub async fn dedupe(&self) -> Result<usize, PipelineError> {
        Ok(self.storage.lock().await.dedupe()?)
    }
}
