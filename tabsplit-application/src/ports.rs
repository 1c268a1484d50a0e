use std::collections::HashMap;

/// Resolves an identity (email, address, ...) to a human-readable name.
pub trait IdentityDirectory: Send + Sync {
    fn display_name(&self, identity: &str) -> Option<&str>;
}

impl IdentityDirectory for HashMap<String, String> {
    fn display_name(&self, identity: &str) -> Option<&str> {
        self.get(identity).map(String::as_str)
    }
}
