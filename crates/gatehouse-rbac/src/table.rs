//! # Group Table Layout
//!
//! Column layout and parameterized statements for SQL-backed group stores.
//! The schema itself is owned by the application; this module only fixes the
//! names the rest of the crate builds predicates against, so a store and the
//! [`AccessQuery`](crate::query::AccessQuery) fragments always agree.
//!
//! Statements use `?` placeholders and MySQL-style quoting. Each statement
//! documents the order its parameters bind in.

use crate::roles::Roles;

/// Name of the membership table.
pub const TABLE: &str = "groups";

/// Column holding the resource kind.
pub const COL_RESOURCE_KIND: &str = "resource_kind";

/// Column holding the resource identifier.
pub const COL_RESOURCE_ID: &str = "resource_id";

/// Column holding the role name.
pub const COL_ROLE_NAME: &str = "role_name";

/// Column holding the member's user id.
pub const COL_USER_ID: &str = "user_id";

/// Audit column set on first insert.
pub const COL_CREATED_AT: &str = "created_at";

/// Audit column refreshed on every upsert.
pub const COL_UPDATED_AT: &str = "updated_at";

/// All columns, in table order.
pub const COLUMNS: [&str; 6] = [
    COL_RESOURCE_KIND,
    COL_RESOURCE_ID,
    COL_ROLE_NAME,
    COL_USER_ID,
    COL_CREATED_AT,
    COL_UPDATED_AT,
];

/// The key a membership row is unique on.
pub const UNIQUE_KEY: [&str; 4] = [COL_RESOURCE_KIND, COL_RESOURCE_ID, COL_ROLE_NAME, COL_USER_ID];

fn column(name: &str) -> String {
    format!("`{}`.`{}`", TABLE, name)
}

fn select_columns() -> String {
    COLUMNS.iter().map(|c| column(c)).collect::<Vec<_>>().join(", ")
}

/// Membership predicate for a single `(kind, id, role, user)` tuple.
fn membership_predicate() -> String {
    format!(
        "({} = ? AND {} = ? AND {} = ? AND {} = ?)",
        column(COL_RESOURCE_KIND),
        column(COL_RESOURCE_ID),
        column(COL_ROLE_NAME),
        column(COL_USER_ID),
    )
}

/// Insert-or-update on the unique key.
///
/// Binds: kind, identifier, role name, user id. Concurrent calls for the same
/// key converge on one row; a repeat only refreshes `updated_at`.
pub fn upsert_membership() -> String {
    format!(
        "INSERT INTO `{TABLE}` (`{COL_RESOURCE_KIND}`, `{COL_RESOURCE_ID}`, `{COL_ROLE_NAME}`, `{COL_USER_ID}`, `{COL_CREATED_AT}`, `{COL_UPDATED_AT}`) \
         VALUES (?, ?, ?, ?, NOW(), NOW()) \
         ON DUPLICATE KEY UPDATE `{COL_UPDATED_AT}` = NOW()"
    )
}

/// Delete one membership.
///
/// Binds: kind, identifier, role name, user id.
pub fn delete_membership() -> String {
    format!("DELETE FROM `{}` WHERE {}", TABLE, membership_predicate())
}

/// Delete every membership on a resource.
///
/// Binds: kind, identifier.
pub fn free_resource() -> String {
    format!(
        "DELETE FROM `{}` WHERE {} = ? AND {} = ?",
        TABLE,
        column(COL_RESOURCE_KIND),
        column(COL_RESOURCE_ID),
    )
}

/// List the members of one role.
///
/// Binds: kind, identifier, role name.
pub fn find_group() -> String {
    format!(
        "SELECT {} FROM `{}` WHERE {} = ? AND {} = ? AND {} = ?",
        select_columns(),
        TABLE,
        column(COL_RESOURCE_KIND),
        column(COL_RESOURCE_ID),
        column(COL_ROLE_NAME),
    )
}

/// Count memberships matching any of `roles` for one user.
///
/// Binds, per role and in role order: kind, identifier, role name, user id.
/// Returns `None` for an empty role set, which must be answered "no" without
/// running a query.
pub fn any_membership(roles: &Roles) -> Option<String> {
    if roles.is_empty() {
        return None;
    }

    let predicates = vec![membership_predicate(); roles.len()].join(" OR ");
    Some(format!("SELECT COUNT(*) FROM `{}` WHERE {}", TABLE, predicates))
}

/// List every membership a user holds on resources of one kind.
///
/// Binds: kind, user id.
pub fn resources_by_kind() -> String {
    format!(
        "SELECT {} FROM `{}` WHERE {} = ? AND {} = ?",
        select_columns(),
        TABLE,
        column(COL_RESOURCE_KIND),
        column(COL_USER_ID),
    )
}
