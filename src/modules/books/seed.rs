use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::models::StoredBook;

struct SeedBook {
    title: &'static str,
    author_id: &'static str,
    price: i64,
    published: bool,
    cover_image: &'static str,
}

const SEED_BOOKS: &[SeedBook] = &[
    SeedBook {
        title: "Book A",
        author_id: "john-doe-uuid-string",
        price: 1233,
        published: false,
        cover_image: "https://some-image-url-1.png",
    },
    SeedBook {
        title: "Book B",
        author_id: "john-doe-uuid-string",
        price: 8533,
        published: true,
        cover_image: "https://some-image-url-2.png",
    },
    SeedBook {
        title: "Imperial March",
        author_id: "darth-vader-id",
        price: 1977,
        published: false,
        cover_image: "https://some-image-url-3.png",
    },
    SeedBook {
        title: "Breathing Exercises",
        author_id: "darth-vader-id",
        price: 499,
        published: false,
        cover_image: "https://some-image-url-4.png",
    },
];

/// Books every fresh process starts with, created four days before `now`.
pub fn seed_books(now: DateTime<Utc>) -> Vec<StoredBook> {
    let created_at = now - Duration::days(4);

    SEED_BOOKS
        .iter()
        .map(|seed| StoredBook {
            id: Uuid::new_v4(),
            author_id: seed.author_id.to_string(),
            title: seed.title.to_string(),
            description: format!("{} description", seed.title),
            price: seed.price,
            cover_image: seed.cover_image.to_string(),
            published: seed.published,
            published_at: seed.published.then_some(created_at),
            unpublished_at: None,
            created_at,
            updated_at: now - Duration::days(1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::policy::default_policy;
    use std::collections::HashSet;

    #[test]
    fn seeds_satisfy_policy_and_title_uniqueness() {
        let policy = default_policy();
        let books = seed_books(Utc::now());

        assert!(books.iter().all(|book| policy.is_allowed(book)));

        let owned_titles: HashSet<_> = books
            .iter()
            .map(|book| (book.author_id.as_str(), book.title.as_str()))
            .collect();
        assert_eq!(owned_titles.len(), books.len());
    }
}
