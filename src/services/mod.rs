pub mod performance;
pub mod purchase_orders;
pub mod vendors;
