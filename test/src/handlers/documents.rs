//! Document routes, checked against the ownership policy.

use actix_web::{get, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use actix_acl::http::error::SecurityError;
use actix_acl::http::security::{Argument, SecurityExt};

use crate::model;
use crate::services::{operation, DocumentService};

#[derive(Deserialize)]
pub struct EditForm {
    title: String,
}

/// Any caller.
#[get("/documents")]
pub async fn list(req: HttpRequest) -> Result<HttpResponse, SecurityError> {
    req.evaluate(&operation("list"), &[])?;
    let titles: Vec<String> = DocumentService
        .list()
        .into_iter()
        .map(|d| format!("{}: {}", d.id, d.title))
        .collect();
    Ok(HttpResponse::Ok().body(titles.join("\n")))
}

/// READ on the document the id resolves to.
#[get("/documents/{id}")]
pub async fn show(req: HttpRequest, path: web::Path<u64>) -> Result<HttpResponse, SecurityError> {
    let id = path.into_inner();
    if model::find(id).is_none() {
        return Ok(HttpResponse::NotFound().finish());
    }
    req.evaluate(&operation("show"), &[Some(Argument::value(id))])?;

    Ok(match DocumentService.show(id) {
        Some(document) => HttpResponse::Ok().body(format!("{} by {}", document.title, document.author)),
        None => HttpResponse::NotFound().finish(),
    })
}

/// WRITE on the document: its author or an ADMIN.
#[put("/documents/{id}")]
pub async fn edit(
    req: HttpRequest,
    path: web::Path<u64>,
    form: web::Form<EditForm>,
) -> Result<HttpResponse, SecurityError> {
    let Some(document) = model::find(path.into_inner()) else {
        return Ok(HttpResponse::NotFound().finish());
    };
    req.evaluate(
        &operation("edit"),
        &[Some(Argument::managed(document.clone())), None],
    )?;

    let edited = DocumentService.edit(&document, &form.title);
    Ok(HttpResponse::Ok().body(format!("renamed to {}", edited.title)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use actix_acl::http::security::SecurityTransform;

    use super::*;

    #[actix_web::test]
    async fn test_show_unknown_document_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::security().unwrap()))
                .wrap(SecurityTransform::new().authenticator(crate::gateway_authenticator))
                .service(show),
        )
        .await;

        let missing = test::TestRequest::get()
            .uri("/documents/99")
            .insert_header(("X-User", "bob"))
            .insert_header(("X-Roles", "USER"))
            .to_request();
        let resp = test::call_service(&app, missing).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let existing = test::TestRequest::get()
            .uri("/documents/1")
            .insert_header(("X-User", "bob"))
            .insert_header(("X-Roles", "USER"))
            .to_request();
        let body = test::call_and_read_body(&app, existing).await;
        assert_eq!(body, "Quarterly report by alice");
    }
}
