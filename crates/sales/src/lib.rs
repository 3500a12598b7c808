//! Orders, returns and refunds as the admin client sees them.
//!
//! The backend serializes these rows with their database column names
//! (`OrderID`, `ReturnStatus`, ...), so the wire names are kept as-is.

pub mod order;
pub mod returns;

pub use order::{OrderDetails, OrderHeader, OrderLine, OrderStatus, OrderSummary, StatusUpdate, invoice_file_name};
pub use returns::{RefundRecord, ReturnAction, ReturnRequest, ReturnStatus};
