//! Known API return codes.
//!
//! The API classifies failures by a numeric code in the response body; the
//! codes below mark transient conditions that call sites retry after a fixed
//! delay. Everything else propagates to the caller.

pub const AUTHORITY_PARAMETER: &str = "800";
pub const UNKNOWN: &str = "1300";

pub const OBJECT_IN_OPERATION: &str = "25013";
pub const PORT_FORWARDING_OBJECT_IN_OPERATION: &str = "25033";
/// Server termination and creation cannot be requested simultaneously.
pub const SERVER_OBJECT_IN_OPERATION: &str = "23006";
pub const SERVER_OBJECT_IN_OPERATION_2: &str = "25017";
pub const PREVIOUS_SERVERS_NOT_TERMINATED: &str = "23003";

pub const DETACHING_MOUNTED_STORAGE: &str = "24002";

/// ACG rules cannot change concurrently. Reserved for rule-change calls,
/// which are not exposed yet.
pub const ACG_CANT_CHANGE_SAME_TIME: &str = "1007009";

/// MySQL instance no longer exists; destroy paths treat this as success.
pub const MYSQL_INSTANCE_NOT_FOUND: &str = "5001017";

/// Codes transient for any operation, regardless of resource.
pub const RETRYABLE: &[&str] = &[
    AUTHORITY_PARAMETER,
    UNKNOWN,
    OBJECT_IN_OPERATION,
    PORT_FORWARDING_OBJECT_IN_OPERATION,
    SERVER_OBJECT_IN_OPERATION,
    SERVER_OBJECT_IN_OPERATION_2,
];
