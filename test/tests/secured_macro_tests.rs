//! #[secured] macro tests.
//!
//! The macro must produce exactly the declarations the builders would.


use actix_acl::http::security::{
    AccessType, OperationDeclaration, ParameterAccess, ResourceType, RolesMode, TypeDeclaration,
};
use actix_acl::secured;

use common::model::{Document, User};
use common::{application, AclService, RestrictedService, Service};

fn find(operations: Vec<OperationDeclaration>, method: &str) -> OperationDeclaration {
    operations
        .into_iter()
        .find(|d| d.operation().method() == method)
        .unwrap_or_else(|| panic!("no declaration for {}", method))
}

// =============================================================================
// Impl blocks
// =============================================================================

#[test]
fn test_type_declaration_named_after_type() {
    assert_eq!(Service::acl_type(), TypeDeclaration::new("Service"));
    assert_eq!(
        RestrictedService::acl_type(),
        TypeDeclaration::new("RestrictedService").roles(&["ADMIN"])
    );
}

#[test]
fn test_every_method_declared() {
    let methods: Vec<String> = Service::acl_operations()
        .iter()
        .map(|d| d.operation().method().to_string())
        .collect();

    assert_eq!(
        methods,
        vec![
            "secured_method",
            "non_secured_method",
            "access_for_admin_only",
            "access_for_admin_and_user",
            "access_for_admin_or_user",
            "access_for_user_only",
        ]
    );
}

#[test]
fn test_method_roles() {
    let operations = Service::acl_operations();

    assert_eq!(
        find(operations.clone(), "secured_method"),
        OperationDeclaration::new("Service", "secured_method").any_role()
    );
    assert_eq!(
        find(operations.clone(), "non_secured_method"),
        OperationDeclaration::new("Service", "non_secured_method")
    );
    assert_eq!(
        find(operations.clone(), "access_for_admin_only"),
        OperationDeclaration::new("Service", "access_for_admin_only").roles(&["ADMIN"])
    );
    assert_eq!(
        find(operations, "access_for_admin_or_user"),
        OperationDeclaration::new("Service", "access_for_admin_or_user")
            .roles(&["ADMIN", "USER"])
            .mode(RolesMode::Any)
    );
}

#[test]
fn test_unsecured_method() {
    assert_eq!(
        find(RestrictedService::acl_operations(), "do_simple_change"),
        OperationDeclaration::new("RestrictedService", "do_simple_change").unsecured()
    );
}

#[test]
fn test_parameter_access_skips_receiver() {
    let operations = AclService::acl_operations();

    assert_eq!(
        find(operations.clone(), "save"),
        OperationDeclaration::new("AclService", "save")
            .access(ParameterAccess::new(0).access_types(&[AccessType::Write, AccessType::Read]))
    );
    assert_eq!(
        find(operations.clone(), "delete"),
        OperationDeclaration::new("AclService", "delete").access(
            ParameterAccess::new(0)
                .access_types(&[AccessType::Delete])
                .resource_type(ResourceType::of::<User>())
        )
    );
    assert_eq!(
        find(operations, "add_document"),
        OperationDeclaration::new("AclService", "add_document").access(
            ParameterAccess::new(0)
                .access_types(&[AccessType::Write])
                .resource_type(ResourceType::of::<Document>())
        )
    );
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_function_declaring_type_override() {
    assert_eq!(
        application::list_documents_requirements(),
        OperationDeclaration::new("Application", "list_documents").any_role()
    );
}

#[test]
fn test_function_default_access_is_read() {
    assert_eq!(
        application::show_user_requirements(),
        OperationDeclaration::new("Application", "show_user").access(ParameterAccess::new(0))
    );
}

#[test]
fn test_function_multiple_parameters() {
    assert_eq!(
        application::show_and_edit_document_requirements(),
        OperationDeclaration::new("Application", "show_and_edit_document")
            .access(ParameterAccess::new(0).access_types(&[AccessType::Read]))
            .access(ParameterAccess::new(1).access_types(&[AccessType::Write]))
    );
}

#[secured(roles("MANAGER"))]
fn approve(_comment: &str, #[access(WRITE, resource = "report")] _report_id: u64) {}

#[test]
fn test_function_declaring_type_defaults_to_module() {
    let declaration = approve_requirements();

    assert_eq!(declaration.operation().declaring_type(), module_path!());
    assert_eq!(
        declaration,
        OperationDeclaration::new(module_path!(), "approve")
            .roles(&["MANAGER"])
            .access(
                ParameterAccess::new(1)
                    .access_types(&[AccessType::Write])
                    .resource_type(ResourceType::named("report"))
            )
    );
}

#[test]
fn test_annotated_function_still_callable() {
    approve("looks good", 3);
    Service.access_for_admin_only();
    application::show_user(&User::new(1, "alice"));
}

// =============================================================================
// Descriptors
// =============================================================================

#[test]
fn test_registry_descriptors() {
    let registry = common::registry();

    let change = registry
        .descriptor(&common::op("RestrictedService", "change_everything"))
        .unwrap();
    assert_eq!(change.required_roles(), &["ADMIN".to_string()]);
    assert!(!change.is_unsecured());

    let simple = registry
        .descriptor(&common::op("RestrictedService", "do_simple_change"))
        .unwrap();
    assert!(simple.is_unsecured());

    let user_only = registry
        .descriptor(&common::op("Service", "access_for_user_only"))
        .unwrap();
    assert_eq!(user_only.required_roles(), &["USER".to_string()]);
    assert_eq!(user_only.roles_mode(), RolesMode::All);
}
