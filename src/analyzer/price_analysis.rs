use crate::sale::Sale;

/// Distribution of `price_single` over a group of similar sales.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStats {
    pub count: usize,
    pub min: f64,
    /// Soft thresholds: percentile based, or the IQR bounds for small groups.
    pub bottom: f64,
    pub mean: f64,
    pub top: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    /// Tukey bounds `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
    pub iqr_bottom: f64,
    pub iqr_top: f64,
    pub mean_without_outliers: f64,
    pub suggested_price: f64,
}

impl PriceStats {
    pub fn is_outlier(&self, price: f64) -> bool {
        price < self.bottom || price > self.top
    }

    pub fn is_hard_outlier(&self, price: f64) -> bool {
        price < self.iqr_bottom || price > self.iqr_top
    }
}

/// Trait defining the interface for a price analyzer.
pub trait Analyzer {
    fn calculate_stats(&self, prices: &[f64]) -> Option<PriceStats>;
    /// Flags outliers in place and returns how many were flagged.
    fn mark_outliers(&self, sales: &mut [Sale], stats: &PriceStats) -> usize;
}

pub struct AnalyzerImpl {
    percentile: f64,
}

/// Groups smaller than this only get the IQR thresholds.
const MIN_SAMPLES_FOR_PERCENTILES: usize = 5;

impl AnalyzerImpl {
    pub fn new(percentile: f64) -> Self {
        Self { percentile }
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

impl Analyzer for AnalyzerImpl {
    /// Zero prices are left out. `None` for an empty group.
    fn calculate_stats(&self, prices: &[f64]) -> Option<PriceStats> {
        let mut sorted: Vec<f64> = prices.iter().copied().filter(|p| *p > 0.0).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 25.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let (iqr_bottom, iqr_top) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        let (bottom, top) = if sorted.len() < MIN_SAMPLES_FOR_PERCENTILES {
            (iqr_bottom, iqr_top)
        } else {
            (
                percentile(&sorted, self.percentile),
                percentile(&sorted, 100.0 - self.percentile),
            )
        };

        let mean_all = mean(&sorted);
        let inliers: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|p| *p >= bottom && *p <= top)
            .collect();
        let mean_without_outliers = if inliers.is_empty() {
            mean_all
        } else {
            mean(&inliers)
        };

        Some(PriceStats {
            count: sorted.len(),
            min: sorted[0],
            bottom,
            mean: mean_all,
            top,
            max: sorted[sorted.len() - 1],
            q1,
            q3,
            iqr_bottom,
            iqr_top,
            mean_without_outliers,
            suggested_price: mean_without_outliers.round(),
        })
    }

    fn mark_outliers(&self, sales: &mut [Sale], stats: &PriceStats) -> usize {
        let mut flagged = 0;
        for sale in sales.iter_mut() {
            sale.is_outlier = sale.price_single > 0.0 && stats.is_outlier(sale.price_single);
            if sale.is_outlier {
                flagged += 1;
            }
        }
        flagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> AnalyzerImpl {
        AnalyzerImpl::new(15.0)
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 0.0), 10.0);
        assert_eq!(percentile(&sorted, 50.0), 25.0);
        assert_eq!(percentile(&sorted, 100.0), 40.0);
        assert_eq!(percentile(&[7.0], 15.0), 7.0);
    }

    #[test]
    fn soft_thresholds_for_larger_groups() {
        let prices = [20.0, 25.0, 30.0, 30.0, 35.0, 40.0, 300.0, 0.0];
        let stats = analyzer().calculate_stats(&prices).unwrap();
        assert_eq!(stats.count, 7);
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 300.0);
        assert!(stats.is_outlier(300.0));
        assert!(stats.is_outlier(20.0));
        assert!(!stats.is_outlier(30.0));
        assert!(stats.is_hard_outlier(300.0));
        assert!(!stats.is_hard_outlier(20.0));
        assert!(stats.mean_without_outliers < stats.mean);
        assert_eq!(stats.suggested_price, stats.mean_without_outliers.round());
    }

    #[test]
    fn small_groups_use_iqr_only() {
        let stats = analyzer().calculate_stats(&[30.0, 32.0, 34.0, 200.0]).unwrap();
        assert_eq!(stats.bottom, stats.iqr_bottom);
        assert_eq!(stats.top, stats.iqr_top);
        assert!(stats.is_outlier(200.0));
        assert!(!stats.is_outlier(30.0));
        assert_eq!(stats.mean_without_outliers, 32.0);
        assert_eq!(stats.suggested_price, 32.0);
    }

    #[test]
    fn empty_or_zero_prices() {
        assert_eq!(analyzer().calculate_stats(&[]), None);
        assert_eq!(analyzer().calculate_stats(&[0.0, 0.0]), None);
    }

    #[test]
    fn non_outlier_count_matches_threshold_window() {
        let prices = [5.0, 12.0, 13.0, 14.0, 15.0, 18.0, 22.0, 90.0, 91.0];
        let stats = analyzer().calculate_stats(&prices).unwrap();
        let inside = prices.iter().filter(|p| **p >= stats.bottom && **p <= stats.top).count();
        let not_outliers = prices.iter().filter(|p| !stats.is_outlier(**p)).count();
        assert_eq!(inside, not_outliers);
    }
}
