pub mod approve_purchase_request_command;
pub mod reject_purchase_request_command;
pub mod submit_purchase_request_command;

pub use approve_purchase_request_command::{
    ApprovePurchaseRequestCommand, ApprovePurchaseRequestResult, StockReconciliation,
};
pub use reject_purchase_request_command::RejectPurchaseRequestCommand;
pub use submit_purchase_request_command::SubmitPurchaseRequestCommand;
