pub mod add_stock_item_command;
pub mod adjust_stock_command;
pub mod delete_stock_item_command;

pub use add_stock_item_command::AddStockItemCommand;
pub use adjust_stock_command::{AdjustStockCommand, AdjustStockResult, StockDirection};
pub use delete_stock_item_command::DeleteStockItemCommand;
