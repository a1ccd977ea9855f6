//! Evaluator tests.
//!
//! Role requirements, parameter checks and the failure sink, evaluated
//! against the declarations of the secured test services.


use std::sync::Arc;

use actix_acl::http::error::{AccessDenied, ConfigurationError, DenialReason, SecurityError};
use actix_acl::http::security::{
    AccessType, AclManaged, Argument, Caller, NotSpecifiedPolicy, OperationDeclaration,
    ParameterAccess, RequestScope, ResourceAccess, UnknownOperationPolicy,
};

use common::model::{Document, User};
use common::{caller, fixture, op};

fn user() -> Option<Caller> {
    Some(caller("user", &["USER"]))
}

fn admin() -> Option<Caller> {
    Some(caller("admin", &["ADMIN"]))
}

fn managed<T: AclManaged>(value: T) -> Option<Argument> {
    Some(Argument::managed(value))
}

fn denial(result: Result<(), SecurityError>) -> AccessDenied {
    match result {
        Err(SecurityError::AccessDenied(denied)) => denied,
        other => panic!("expected a denial, got {:?}", other),
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_no_annotations_no_caller_allowed() {
    let fx = fixture(None);

    let result = fx
        .security
        .evaluate(&RequestScope::new(), &op("Application", "index"), &[]);

    assert!(result.is_ok());
    assert!(fx.sink.failures().is_empty());
}

#[test]
fn test_admin_required_user_denied() {
    let fx = fixture(user());

    let denied = denial(fx.security.evaluate(
        &RequestScope::new(),
        &op("Service", "access_for_admin_only"),
        &[],
    ));

    assert_eq!(denied.operation(), &op("Service", "access_for_admin_only"));
    assert_eq!(denied.reason(), DenialReason::MissingRoles);
    assert!(denied.resources().is_empty());
}

#[test]
fn test_write_user_by_id_denied_for_user_role() {
    let fx = fixture(user());

    let denied = denial(fx.security.evaluate(
        &RequestScope::new(),
        &op("Application", "edit_user_by_id"),
        &[Some(Argument::value(3_u64))],
    ));

    assert_eq!(denied.reason(), DenialReason::ResourceDenied);
    assert_eq!(denied.resources().len(), 1);
    assert!(denied.resources()[0].is::<User>());
}

#[test]
fn test_write_user_instance_denied_for_user_role() {
    let fx = fixture(user());
    let target = User::new(3, "bob");

    let denied = denial(fx.security.evaluate(
        &RequestScope::new(),
        &op("AclService", "save"),
        &[managed(target.clone())],
    ));

    assert_eq!(denied.operation(), &op("AclService", "save"));
    assert_eq!(denied.resources().len(), 1);
    assert_eq!(denied.resources()[0].downcast_ref::<User>(), Some(&target));
    assert_eq!(fx.sink.failures().len(), 1);
}

#[test]
fn test_write_user_instance_allowed_for_admin() {
    let fx = fixture(admin());

    let result = fx.security.evaluate(
        &RequestScope::new(),
        &op("AclService", "save"),
        &[managed(User::new(3, "bob"))],
    );

    assert!(result.is_ok());
    assert!(fx.sink.failures().is_empty());
}

#[test]
fn test_second_document_denied_and_checked_last() {
    let fx = fixture(user());
    let doc = Document::new(1);
    let doc2 = Document::new(2);

    let denied = denial(fx.security.evaluate(
        &RequestScope::new(),
        &op("Application", "show_and_edit_document"),
        &[managed(doc.clone()), managed(doc2.clone())],
    ));

    assert_eq!(denied.resources()[0].downcast_ref::<Document>(), Some(&doc2));
    assert_eq!(
        fx.resolver.checked(),
        vec![format!("{:?}", doc), format!("{:?}", doc2)]
    );
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_unsecured_ignores_type_roles() {
    let fx = fixture(None);

    let result = fx.security.evaluate(
        &RequestScope::new(),
        &op("RestrictedService", "do_simple_change"),
        &[],
    );

    assert!(result.is_ok());
}

#[test]
fn test_type_roles_inherited() {
    let scope = RequestScope::new();
    let change = op("RestrictedService", "change_everything");

    assert!(fixture(user())
        .security
        .evaluate(&scope, &change, &[])
        .is_err());
    assert!(fixture(admin())
        .security
        .evaluate(&scope, &change, &[])
        .is_ok());
}

#[test]
fn test_any_role_requires_caller_only() {
    let secured = op("Service", "secured_method");

    let denied = denial(fixture(None).security.evaluate(&RequestScope::new(), &secured, &[]));
    assert_eq!(denied.reason(), DenialReason::NoCaller);

    let nobody = Some(caller("nobody", &[]));
    assert!(fixture(nobody)
        .security
        .evaluate(&RequestScope::new(), &secured, &[])
        .is_ok());
}

#[test]
fn test_all_mode() {
    let both = op("Service", "access_for_admin_and_user");

    assert!(fixture(admin())
        .security
        .evaluate(&RequestScope::new(), &both, &[])
        .is_err());
    assert!(fixture(Some(caller("root", &["USER", "ADMIN"])))
        .security
        .evaluate(&RequestScope::new(), &both, &[])
        .is_ok());
}

#[test]
fn test_any_mode() {
    let either = op("Service", "access_for_admin_or_user");

    assert!(fixture(user())
        .security
        .evaluate(&RequestScope::new(), &either, &[])
        .is_ok());

    let denied = denial(fixture(None).security.evaluate(&RequestScope::new(), &either, &[]));
    assert_eq!(denied.reason(), DenialReason::NoCaller);
}

#[test]
fn test_first_denial_short_circuits() {
    let fx = fixture(user());
    let security = fx.security.registry(
        common::registry().with_operation(
            OperationDeclaration::new("Application", "move_document")
                .access(ParameterAccess::new(0).access_types(&[AccessType::Write]))
                .access(ParameterAccess::new(1)),
        ),
    );
    let doc = Document::new(1);

    let result = security.evaluate(
        &RequestScope::new(),
        &op("Application", "move_document"),
        &[managed(doc.clone()), managed(Document::new(2))],
    );

    assert!(result.is_err());
    assert_eq!(fx.resolver.checked(), vec![format!("{:?}", doc)]);
}

#[test]
fn test_null_argument_skipped() {
    let fx = fixture(user());

    let result = fx.security.evaluate(
        &RequestScope::new(),
        &op("Application", "show_and_edit_document"),
        &[managed(Document::new(1)), None],
    );

    assert!(result.is_ok());
    assert_eq!(fx.resolver.checked().len(), 1);
}

#[test]
fn test_sink_not_called_on_allow() {
    let fx = fixture(admin());

    fx.security
        .evaluate(&RequestScope::new(), &op("Service", "access_for_admin_only"), &[])
        .unwrap();

    assert!(fx.sink.failures().is_empty());
}

#[test]
fn test_sink_called_once_per_denial() {
    let fx = fixture(user());

    let _ = fx.security.evaluate(
        &RequestScope::new(),
        &op("Application", "show_and_edit_document"),
        &[managed(Document::new(1)), managed(Document::new(2))],
    );

    let failures = fx.sink.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, op("Application", "show_and_edit_document"));
    assert_eq!(failures[0].1, vec![format!("{:?}", Document::new(2))]);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_id_resolved_into_document() {
    let fx = fixture(user());

    let result = fx.security.evaluate(
        &RequestScope::new(),
        &op("Application", "show_document_by_id"),
        &[Some(Argument::value(7_u64))],
    );

    assert!(result.is_ok());
    assert_eq!(fx.resolver.checked(), vec![format!("{:?}", Document::new(7))]);
}

#[test]
fn test_resolved_user_denied() {
    let fx = fixture(user());

    let denied = denial(fx.security.evaluate(
        &RequestScope::new(),
        &op("AclService", "delete"),
        &[Some(Argument::value(5_u64))],
    ));

    let resolved = denied.resources()[0].downcast_ref::<User>().cloned();
    assert_eq!(resolved, Some(User::new(5, "resolved")));
}

#[test]
fn test_managed_argument_converted_to_declared_type() {
    let fx = fixture(admin());

    let result = fx.security.evaluate(
        &RequestScope::new(),
        &op("AclService", "add_document"),
        &[managed(User::new(1, "alice")), managed(Document::new(9))],
    );

    assert!(result.is_ok());
    let checked = fx.resolver.checked();
    assert_eq!(checked.len(), 1);
    assert!(checked[0].contains("Document"));
    assert!(checked[0].contains("alice"));
}

#[test]
fn test_resolution_failure_is_configuration_error() {
    let fx = fixture(admin());

    let result = fx.security.evaluate(
        &RequestScope::new(),
        &op("Application", "edit_user_by_id"),
        &[Some(Argument::value("three"))],
    );

    match result {
        Err(SecurityError::Configuration(ConfigurationError::Resolution { parameter, .. })) => {
            assert_eq!(parameter, 0)
        }
        other => panic!("expected a resolution error, got {:?}", other),
    }
    assert!(fx.sink.failures().is_empty());
}

#[test]
fn test_missing_argument_is_configuration_error() {
    let fx = fixture(admin());

    let result = fx
        .security
        .evaluate(&RequestScope::new(), &op("Application", "show_user"), &[]);

    assert!(matches!(
        result,
        Err(SecurityError::Configuration(ConfigurationError::MissingArgument {
            parameter: 0,
            supplied: 0,
            ..
        }))
    ));
}

#[test]
fn test_unmanaged_argument_is_configuration_error() {
    let fx = fixture(admin());

    let result = fx.security.evaluate(
        &RequestScope::new(),
        &op("Application", "show_user"),
        &[Some(Argument::value(1_u64))],
    );

    assert!(matches!(
        result,
        Err(SecurityError::Configuration(
            ConfigurationError::UnmanagedArgument { .. }
        ))
    ));
}

// =============================================================================
// Registry policies
// =============================================================================

#[test]
fn test_unknown_operation_rejected() {
    let fx = fixture(admin());

    let result = fx
        .security
        .evaluate(&RequestScope::new(), &op("Service", "missing"), &[]);

    assert!(matches!(
        result,
        Err(SecurityError::Configuration(
            ConfigurationError::UnknownOperation { .. }
        ))
    ));
}

#[test]
fn test_unknown_operation_legacy_unsecured() {
    let fx = fixture(None);
    let security = fx
        .security
        .registry(common::registry().unknown_operation(UnknownOperationPolicy::Unsecured));

    assert!(security
        .evaluate(&RequestScope::new(), &op("Service", "missing"), &[])
        .is_ok());
}

#[test]
fn test_not_specified_policy() {
    use actix_acl::http::security::{
        AccessDecision, AccessResolver, AnonymousCallerProvider, RoleHolder, Security,
    };

    struct NoOpinion;

    impl AccessResolver for NoOpinion {
        fn check_access(
            &self,
            _caller: Option<&dyn RoleHolder>,
            _resource: &dyn AclManaged,
            _access_types: &[AccessType],
        ) -> AccessDecision {
            AccessDecision::NotSpecified
        }
    }

    let security = Security::new(Arc::new(AnonymousCallerProvider), Arc::new(NoOpinion))
        .registry(common::registry());
    let edit = op("Application", "edit_document");
    let args = [managed(Document::new(1))];

    assert!(security.evaluate(&RequestScope::new(), &edit, &args).is_ok());
    assert!(security
        .not_specified(NotSpecifiedPolicy::Deny)
        .evaluate(&RequestScope::new(), &edit, &args)
        .is_err());
}

// =============================================================================
// Helpers
// =============================================================================

#[test]
fn test_has_roles_and_caller_present() {
    let scope = RequestScope::new();

    let fx = fixture(Some(caller("root", &["ADMIN", "USER"])));
    assert!(fx.security.has_roles(&scope, &["ADMIN", "USER"]));
    assert!(!fx.security.has_roles(&scope, &["ADMIN", "MANAGER"]));
    assert!(!fx.security.has_roles(&scope, &[]));
    assert!(fx.security.is_caller_present(&scope));

    let anonymous = fixture(None);
    assert!(!anonymous.security.has_roles(&scope, &["USER"]));
    assert!(!anonymous.security.is_caller_present(&scope));
}

#[test]
fn test_has_access() {
    let scope = RequestScope::new();
    let doc = Document::new(4);

    let fx = fixture(user());
    assert!(fx.security.has_access(&scope, &doc, &[AccessType::Read]));
    assert!(!fx.security.has_access(&scope, &doc, &[AccessType::Write]));
    assert!(fx.sink.failures().is_empty());
}

#[test]
fn test_check_resources_names_denied_resource() {
    let fx = fixture(user());
    let scope = RequestScope::new();
    let entries = vec![
        ResourceAccess::new(Arc::new(Document::new(1)), &[AccessType::Read]),
        ResourceAccess::new(Arc::new(Document::new(2)), &[AccessType::Delete]),
        ResourceAccess::new(Arc::new(Document::new(3)), &[AccessType::Read]),
    ];

    assert!(!fx.security.has_access_all(&scope, &entries));

    let denied = denial(fx.security.check_resources(
        &scope,
        &op("Application", "cleanup"),
        &entries,
    ));
    assert_eq!(denied.resources().len(), 1);
    assert_eq!(
        denied.resources()[0].downcast_ref::<Document>(),
        Some(&Document::new(2))
    );
    assert_eq!(fx.sink.failures().len(), 1);
}
