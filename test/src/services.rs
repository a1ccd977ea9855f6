//! Secured document operations.

use actix_acl::http::security::{OperationId, RequirementRegistry};
use actix_acl::secured;

use crate::model::{self, Document};

pub struct DocumentService;

#[secured(any_role)]
impl DocumentService {
    pub fn list(&self) -> Vec<Document> {
        model::documents()
    }

    pub fn show(&self, #[access(READ, resource = Document)] id: u64) -> Option<Document> {
        model::find(id)
    }

    pub fn edit(&self, #[access(WRITE)] document: &Document, title: &str) -> Document {
        Document {
            title: title.to_string(),
            ..document.clone()
        }
    }

    #[secured("ADMIN")]
    pub fn purge(&self) -> usize {
        model::documents().len()
    }

    #[secured(unsecured)]
    pub fn count(&self) -> usize {
        model::documents().len()
    }
}

pub fn operation(method: &'static str) -> OperationId {
    OperationId::new("DocumentService", method)
}

pub fn registry() -> RequirementRegistry {
    RequirementRegistry::new()
        .with_type(DocumentService::acl_type())
        .with_operations(DocumentService::acl_operations())
}
