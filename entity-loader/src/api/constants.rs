//! Header names, multipart field names and fixed payload values

/// Headers attached to authenticated requests
pub mod headers {
    pub const AUTH_TOKEN: &str = "X-auth-token";
    pub const INTERNAL_ACCESS_TOKEN: &str = "internal-access-token";
}

/// Multipart field names each upload endpoint reads its CSV from
pub mod form_fields {
    pub const ENTITY_TYPES: &str = "entityTypes";
    pub const ENTITIES: &str = "entities";
    pub const ENTITY_CSV: &str = "entityCSV";
    pub const ENTITY_MAP: &str = "entityMap";
}

pub const CSV_MIME: &str = "text/csv";

/// Status given to user roles whose row leaves `status` blank
pub const DEFAULT_ROLE_STATUS: &str = "ACTIVE";
