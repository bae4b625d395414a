// Group of similar sales around one master: display table, outliers, pricing
use super::price_analysis::{Analyzer, PriceStats};
use crate::registry::Label;
use crate::sale::Sale;
use chrono::NaiveDate;

/// Display projection of one sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub sale_id: String,
    pub title: String,
    pub source: String,
    pub start_date: NaiveDate,
    pub price_single: f64,
    pub region: String,
    pub sub_category: String,
    pub text: String,
    pub entity_labels: String,
    pub is_outlier: bool,
}

/// One row per (sale, master entity it shares), keyed by `"<label>: <name>"`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRow {
    pub plot_category: String,
    pub sale_id: String,
    pub price_single: f64,
    pub start_date: NaiveDate,
}

pub struct SaleList {
    master: Sale,
    sales: Vec<Sale>,
    relevant: Vec<Label>,
}

impl SaleList {
    pub fn new(master: Sale, relevant: &[Label]) -> Self {
        Self {
            master,
            sales: Vec::new(),
            relevant: relevant.to_vec(),
        }
    }

    pub fn push(&mut self, sale: Sale) {
        if !self.sales.iter().any(|s| s.sale_id == sale.sale_id) {
            self.sales.push(sale);
        }
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Computes the price distribution and flags outliers on every member.
    pub fn price_report(&mut self, analyzer: &impl Analyzer) -> Option<PriceStats> {
        let prices: Vec<f64> = self.sales.iter().map(|s| s.price_single).collect();
        let stats = analyzer.calculate_stats(&prices)?;
        analyzer.mark_outliers(&mut self.sales, &stats);
        Some(stats)
    }

    pub fn outlier_count(&self) -> usize {
        self.sales.iter().filter(|s| s.is_outlier).count()
    }

    /// Members outside the Tukey fences, whatever the group size.
    pub fn hard_outlier_count(&self, stats: &PriceStats) -> usize {
        self.sales
            .iter()
            .filter(|s| s.price_single > 0.0 && stats.is_hard_outlier(s.price_single))
            .count()
    }

    pub fn table(&self) -> Vec<SaleRow> {
        let mut rows: Vec<SaleRow> = self
            .sales
            .iter()
            .map(|s| SaleRow {
                sale_id: s.sale_id.clone(),
                title: s.title.clone(),
                source: s.source.as_str().to_string(),
                start_date: s.start_date,
                price_single: s.price_single,
                region: s.region.name().to_string(),
                sub_category: s
                    .product_sub_category
                    .map(|c| c.name().to_string())
                    .unwrap_or_default(),
                text: s.text(),
                entity_labels: s
                    .entities_in_order(&self.relevant)
                    .iter()
                    .map(|(n, l)| format!("{}: {}", l, n))
                    .collect::<Vec<_>>()
                    .join(", "),
                is_outlier: s.is_outlier,
            })
            .collect();
        rows.sort_by(|a, b| a.price_single.total_cmp(&b.price_single));
        rows
    }

    pub fn plot_rows(&self) -> Vec<PlotRow> {
        let mut rows = Vec::new();
        for (name, label) in self.master.entities_in_order(&self.relevant) {
            for sale in &self.sales {
                if sale.entity_label_dict.get(&name) == Some(&label) {
                    rows.push(PlotRow {
                        plot_category: format!("{}: {}", label, name),
                        sale_id: sale.sale_id.clone(),
                        price_single: sale.price_single,
                        start_date: sale.start_date,
                    });
                }
            }
        }
        rows
    }
}
