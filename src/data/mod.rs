//! Data module - table loading, cell coercion, column roles and previews

mod loader;
mod preview;
mod processor;
mod roles;

pub use loader::{LoaderError, TableLoader};
pub use preview::{escape_html, TablePreview, PREVIEW_ROWS};
pub use processor::{is_numeric_dtype, parse_date, parse_number, Coerced, DataProcessor, BLANK_LABEL};
pub use roles::{
    normalize_name, ColumnRole, ColumnRoles, AMOUNT_KEYWORDS, CUSTOMER_KEYWORDS, DATE_KEYWORDS,
    KEYWORD_TABLE_VERSION, PRODUCT_KEYWORDS, ROLE_KEYWORDS,
};
