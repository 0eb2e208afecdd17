use redb::TableDefinition;

/// Messages: message id (uuid) -> Message (JSON)
pub const MESSAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("messages");

/// Users: email address -> User (JSON)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Pending login tokens: token (uuid) -> Login (JSON)
pub const LOGINS: TableDefinition<&str, &[u8]> = TableDefinition::new("logins");

/// Response slots: hex SHA-256 of (recipient, option, message id) -> Response (JSON)
pub const RESPONSES: TableDefinition<&str, &[u8]> = TableDefinition::new("responses");
