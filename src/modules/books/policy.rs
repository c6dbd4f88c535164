use shelf_authz::{ForbiddenCombination, PolicyEngine};
use shelf_db::Criteria;

use super::models::{BookField, StoredBook};

/// Identity that may keep drafts but never publish.
pub const EMBARGOED_AUTHOR_ID: &str = "darth-vader-id";

/// The admission rules every book mutation is checked against.
pub fn default_policy() -> PolicyEngine<StoredBook> {
    PolicyEngine::new().with_rule(ForbiddenCombination::new(
        "embargoed-author-cannot-publish",
        Criteria::new()
            .with(BookField::AuthorId, EMBARGOED_AUTHOR_ID)
            .with(BookField::Published, true),
    ))
}
