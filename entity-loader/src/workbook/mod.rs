//! Entity management workbook
//!
//! The input is a single `.xlsx` file whose sheets must be exactly, and in
//! this order:
//! - `EntityType` -> entity type definitions
//! - `state`, `district`, `block`, `cluster`, `school` -> entities per level
//! - `entityCSV` -> input for server-side parent/child pairing
//! - `UserExtension` -> user roles

pub mod convert;
pub mod template;

pub use convert::convert_sheets;
pub use template::{read_sheet_names, validate_sheet_names};

/// Sheet of entity type definitions
pub const ENTITY_TYPE_SHEET: &str = "EntityType";
/// Sheet posted to the mapping generator
pub const ENTITY_CSV_SHEET: &str = "entityCSV";
/// Sheet of user roles
pub const USER_EXTENSION_SHEET: &str = "UserExtension";

/// Sheet names a workbook must carry, in order
pub const TEMPLATE_SHEETS: [&str; 8] = [
    ENTITY_TYPE_SHEET,
    "state",
    "district",
    "block",
    "cluster",
    "school",
    ENTITY_CSV_SHEET,
    USER_EXTENSION_SHEET,
];
