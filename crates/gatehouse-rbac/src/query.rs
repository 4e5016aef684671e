//! # Access Queries
//!
//! Builds a parameterized predicate meaning "this row is reachable by a user
//! through a role on a resource of some kind". The fragment is meant to be
//! joined into a larger query by the caller (typically against the group
//! table joined on the entity's id); building it performs no I/O.

use serde::{Deserialize, Serialize};

use crate::error::{RbacError, RbacResult};
use crate::resources::ResourceKind;
use crate::roles::RoleName;
use crate::table::{COL_RESOURCE_KIND, COL_ROLE_NAME, COL_USER_ID, TABLE};

/// Inputs for an access predicate.
///
/// # Example
///
/// ```
/// use gatehouse_rbac::AccessQuery;
///
/// let predicate = AccessQuery::new("u1", "doc", "viewer").build().unwrap();
/// assert_eq!(predicate.params, vec!["u1", "doc", "viewer"]);
/// assert!(AccessQuery::new("", "doc", "viewer").build().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessQuery {
    /// User the rows must be reachable by.
    pub user_id: String,

    /// Kind of resource the rows belong to.
    pub kind: ResourceKind,

    /// Role the user must hold.
    pub role_name: RoleName,
}

/// A boolean SQL fragment and the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    /// SQL fragment with `?` placeholders.
    pub sql: String,

    /// Values bound to the placeholders.
    pub params: Vec<String>,
}

impl AccessQuery {
    /// Create an access query.
    pub fn new(
        user_id: impl Into<String>,
        kind: impl Into<ResourceKind>,
        role_name: impl Into<RoleName>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind: kind.into(),
            role_name: role_name.into(),
        }
    }

    /// Build the predicate.
    ///
    /// # Errors
    ///
    /// [`RbacError::InvalidArgument`] if the user id, kind or role name is
    /// empty.
    pub fn build(&self) -> RbacResult<Predicate> {
        if self.user_id.is_empty() {
            return Err(RbacError::InvalidArgument("user id must not be empty"));
        }

        if self.kind.is_empty() {
            return Err(RbacError::InvalidArgument("resource kind must not be empty"));
        }

        if self.role_name.is_empty() {
            return Err(RbacError::InvalidArgument("role name must not be empty"));
        }

        let sql = format!(
            "(`{TABLE}`.`{COL_USER_ID}` = ? AND `{TABLE}`.`{COL_RESOURCE_KIND}` = ? AND `{TABLE}`.`{COL_ROLE_NAME}` = ?)"
        );

        Ok(Predicate {
            sql,
            params: vec![
                self.user_id.clone(),
                self.kind.as_str().to_string(),
                self.role_name.as_str().to_string(),
            ],
        })
    }
}

/// Build an access predicate in one call.
pub fn build(
    user_id: impl Into<String>,
    kind: impl Into<ResourceKind>,
    role_name: impl Into<RoleName>,
) -> RbacResult<Predicate> {
    AccessQuery::new(user_id, kind, role_name).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_predicate() {
        let predicate = build("u1", "doc", "viewer").unwrap();

        assert_eq!(
            predicate.sql,
            "(`groups`.`user_id` = ? AND `groups`.`resource_kind` = ? AND `groups`.`role_name` = ?)"
        );
        assert_eq!(predicate.params, vec!["u1", "doc", "viewer"]);
    }

    #[test]
    fn test_placeholders_match_params() {
        let predicate = build("u1", "doc", "viewer").unwrap();
        assert_eq!(predicate.sql.matches('?').count(), predicate.params.len());
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(matches!(build("", "doc", "viewer"), Err(RbacError::InvalidArgument(_))));
        assert!(matches!(build("u1", "", "viewer"), Err(RbacError::InvalidArgument(_))));
        assert!(matches!(build("u1", "doc", ""), Err(RbacError::InvalidArgument(_))));
    }

    #[test]
    fn test_build_is_reusable() {
        let query = AccessQuery::new("u1", "doc", "viewer");
        assert_eq!(query.build().unwrap(), query.build().unwrap());
    }
}
