/// A permission a caller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Change site settings, including the selected theme.
    ManageOptions,
    /// Open the theme settings page.
    EditThemeOptions,
}

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// User id nonces are bound to; 0 for anonymous callers.
    pub user_id: u64,
    pub capabilities: Vec<Capability>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            user_id: 0,
            capabilities: Vec::new(),
        }
    }

    /// An administrator holding every capability.
    pub fn admin(user_id: u64) -> Self {
        Self {
            user_id,
            capabilities: vec![Capability::ManageOptions, Capability::EditThemeOptions],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
