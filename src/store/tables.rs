use redb::TableDefinition;

/// Credentials: fixed key "auth" -> StoredCredentials (bincode)
pub const CREDENTIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

/// The single row under which credentials live.
pub const CREDENTIALS_KEY: &str = "auth";
