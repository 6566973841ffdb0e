//! Linear filters over a decoded snapshot. No indexes.

use fl_types::{PostId, PostRecord};

/// Records written by `author`, in ledger order.
pub fn by_author(records: Vec<PostRecord>, author: &str) -> Vec<PostRecord> {
    records.into_iter().filter(|r| r.is_by(author)).collect()
}

/// Records written by `author` whose image reference equals `image_ref`.
///
/// Text posts carry an empty image reference, so `image_ref = ""` selects an
/// author's text-only posts.
pub fn by_author_and_image(
    records: Vec<PostRecord>,
    author: &str,
    image_ref: &str,
) -> Vec<PostRecord> {
    records
        .into_iter()
        .filter(|r| r.is_by(author) && r.image_ref_or_empty() == image_ref)
        .collect()
}

/// The record with `post_id`, if any.
pub fn by_id(records: Vec<PostRecord>, post_id: &PostId) -> Option<PostRecord> {
    records.into_iter().find(|r| &r.id == post_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_types::{MediaType, PublicKey};

    fn post(id: &str, author: &str, image: Option<&str>) -> PostRecord {
        PostRecord::new(
            PostId::new(id).unwrap(),
            PublicKey::new(author).unwrap(),
            "",
            if image.is_some() { MediaType::Image } else { MediaType::Text },
            image.map(str::to_string),
        )
    }

    fn ledger() -> Vec<PostRecord> {
        vec![
            post("p1", "A1", None),
            post("p2", "A2", Some("img-x")),
            post("p3", "A1", Some("img-x")),
            post("p4", "A1", Some("img-y")),
        ]
    }

    fn ids(records: &[PostRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn author_filter_keeps_order() {
        assert_eq!(ids(&by_author(ledger(), "A1")), ["p1", "p3", "p4"]);
        assert_eq!(ids(&by_author(ledger(), "A2")), ["p2"]);
    }

    #[test]
    fn unknown_author_is_empty_not_error() {
        assert!(by_author(ledger(), "nobody").is_empty());
    }

    #[test]
    fn author_and_image_filter() {
        assert_eq!(ids(&by_author_and_image(ledger(), "A1", "img-x")), ["p3"]);
        assert_eq!(ids(&by_author_and_image(ledger(), "A1", "")), ["p1"]);
        assert!(by_author_and_image(ledger(), "A2", "img-y").is_empty());
    }

    #[test]
    fn id_lookup() {
        let found = by_id(ledger(), &PostId::new("p2").unwrap()).unwrap();
        assert_eq!(found.author.as_str(), "A2");
        assert!(by_id(ledger(), &PostId::new("p9").unwrap()).is_none());
    }
}
