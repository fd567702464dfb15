//! Access control and input validation tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::access::{authorize, AccessError, Identity, ADMINISTRATOR};
use shared::models::{NewProduct, NewUser, SupplierInput, UpdateUserRoles, SelectedRole};
use uuid::Uuid;
use validator::Validate;

fn identity(roles: &[&str]) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        name: "tester".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

fn role_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Clerk".to_string()),
        Just("Manager".to_string()),
        Just("administrator".to_string()),
        Just("ADMINISTRATOR".to_string()),
        "[A-Za-z]{1,12}",
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_unauthenticated_caller_is_refused_before_role_check() {
        assert_eq!(
            authorize(None, Some(ADMINISTRATOR)),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn test_administrator_passes_gate() {
        let admin = identity(&[ADMINISTRATOR]);
        let passed = authorize(Some(&admin), Some(ADMINISTRATOR)).unwrap();
        assert_eq!(passed.user_id, admin.user_id);
    }

    #[test]
    fn test_new_product_rejects_negative_price() {
        let input = NewProduct {
            name: "Drill".to_string(),
            description: None,
            price: Decimal::new(-100, 2),
            stock_quantity: 1,
            low_stock_threshold: 0,
            category_id: None,
            supplier_id: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_supplier_email_validated() {
        let input = SupplierInput {
            name: "Acme".to_string(),
            contact_name: None,
            email: Some("not-an-email".to_string()),
            phone: None,
            address: None,
        };
        assert!(input.validate().is_err());

        let input = SupplierInput {
            email: None,
            ..input
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_new_user_password_rules() {
        let user = NewUser {
            user_name: "sara".to_string(),
            email: "sara@example.com".to_string(),
            phone: None,
            password: "short".to_string(),
            roles: None,
        };
        assert!(user.validate().is_err());

        let user = NewUser {
            password: "longenough1".to_string(),
            ..user
        };
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_update_user_roles_keeps_selected_only() {
        let input = UpdateUserRoles {
            roles: vec![
                SelectedRole {
                    role_name: ADMINISTRATOR.to_string(),
                    is_selected: true,
                },
                SelectedRole {
                    role_name: "Clerk".to_string(),
                    is_selected: false,
                },
            ],
        };
        assert_eq!(input.selected(), vec![ADMINISTRATOR.to_string()]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Only an exact Administrator claim opens the gate
        #[test]
        fn prop_admin_gate_requires_exact_claim(
            roles in prop::collection::vec(role_strategy(), 0..5)
        ) {
            let role_refs: Vec<&str> = roles.iter().map(String::as_str).collect();
            let caller = identity(&role_refs);
            let result = authorize(Some(&caller), Some(ADMINISTRATOR));

            if roles.iter().any(|r| r == ADMINISTRATOR) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(AccessError::MissingRole(ADMINISTRATOR.to_string())));
            }
        }

        /// Any authenticated caller passes when no role is required
        #[test]
        fn prop_authenticated_passes_without_role(
            roles in prop::collection::vec(role_strategy(), 0..5)
        ) {
            let role_refs: Vec<&str> = roles.iter().map(String::as_str).collect();
            let caller = identity(&role_refs);
            prop_assert!(authorize(Some(&caller), None).is_ok());
        }
    }
}
