use crate::model::ListingStatus;
use crate::sale::{Sale, SaleState};

/// Sale state implied by re-reading a listing; `None` keeps the listing open.
pub fn state_for_status(status: &ListingStatus) -> Option<SaleState> {
    match status {
        ListingStatus::Available(_) => None,
        ListingStatus::Sold => Some(SaleState::Sold),
        ListingStatus::Withdrawn => Some(SaleState::Withdrawn),
        ListingStatus::OnHold => Some(SaleState::OnHold),
        ListingStatus::NotFound => Some(SaleState::Vanished),
    }
}

/// How the children of one master fared on the market.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleIndicators {
    pub children: usize,
    pub open: usize,
    pub sold: usize,
    pub vanished: usize,
    pub withdrawn: usize,
    /// Mean of `last_check_date - start_date` over closed children.
    pub avg_days_on_market: Option<f64>,
    /// Sold children over all closed children.
    pub sold_share: Option<f64>,
}

pub fn build_lifecycle_data(children: &[Sale]) -> LifecycleIndicators {
    let mut data = LifecycleIndicators {
        children: children.len(),
        ..Default::default()
    };
    let mut closed_days: Vec<i64> = Vec::new();

    for child in children {
        match child.sale_state {
            SaleState::Open | SaleState::OnHold => data.open += 1,
            SaleState::Sold => data.sold += 1,
            SaleState::Vanished => data.vanished += 1,
            SaleState::Withdrawn => data.withdrawn += 1,
        }
        if child.sale_state.is_terminal() {
            closed_days.push((child.last_check_date - child.start_date).num_days().max(0));
        }
    }

    if !closed_days.is_empty() {
        let total: i64 = closed_days.iter().sum();
        data.avg_days_on_market = Some(total as f64 / closed_days.len() as f64);
        data.sold_share = Some(data.sold as f64 / closed_days.len() as f64);
    }
    data
}
