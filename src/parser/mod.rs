pub mod listing;
pub mod virtual_sales;

pub use virtual_sales::VirtualSalesParser;
