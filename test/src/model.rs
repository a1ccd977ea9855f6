//! Demo domain: documents owned by their author.

use actix_acl::http::security::AclManaged;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: u64,
    pub title: String,
    pub author: String,
}

impl AclManaged for Document {}

/// Fixed document store.
pub fn documents() -> Vec<Document> {
    vec![
        Document {
            id: 1,
            title: "Quarterly report".into(),
            author: "alice".into(),
        },
        Document {
            id: 2,
            title: "Release notes".into(),
            author: "bob".into(),
        },
    ]
}

pub fn find(id: u64) -> Option<Document> {
    documents().into_iter().find(|d| d.id == id)
}
