/// A username/password pair and the identity it unlocks.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub user_id: String,
    pub is_admin: bool,
}

impl Credential {
    pub fn new(username: &str, password: &str, user_id: &str, is_admin: bool) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            user_id: user_id.to_string(),
            is_admin,
        }
    }
}

/// Fixed, process-local list of credentials.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: Vec<Credential>,
}

impl CredentialStore {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    /// The built-in accounts available to every fresh process.
    pub fn seeded() -> Self {
        Self::new(vec![
            Credential::new("john-doe", "YAY", "john-doe-uuid-string", true),
            Credential::new("darth-vader", "NOO", "darth-vader-id", false),
        ])
    }

    /// The credential whose username and password both match exactly.
    pub fn find(&self, username: &str, password: &str) -> Option<&Credential> {
        self.credentials
            .iter()
            .find(|c| c.username == username && c.password == password)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
