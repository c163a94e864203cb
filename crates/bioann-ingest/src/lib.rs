pub mod csv_table;
pub mod polars_utils;
pub mod prefix;
pub mod records;

pub use csv_table::{read_annotation_input, read_csv_table, write_csv_table};
pub use polars_utils::{any_to_string, any_to_string_non_empty, column_strings, format_numeric};
pub use prefix::{OBO_PURL_BASE, add_obo_prefix, obo_purl};
pub use records::records_to_frame;
