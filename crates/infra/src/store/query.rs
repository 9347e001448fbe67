//! SQL construction for scoped queries.
//!
//! The organization filter is appended while the statement is built, so the
//! database only ever returns rows inside the caller's scope.

use sqlx::{Postgres, QueryBuilder};

use shopdesk_auth::OrganizationScope;

use super::PageRequest;

/// Append `AND organization_id = $n` unless the scope is unrestricted.
pub fn push_scope_filter(qb: &mut QueryBuilder<'_, Postgres>, scope: &OrganizationScope) {
    if let Some(org) = scope.organization_id() {
        qb.push(" AND organization_id = ");
        qb.push_bind(*org.as_uuid());
    }
}

pub fn scoped_list_query(kind: &'static str, scope: &OrganizationScope, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT body FROM scoped_records WHERE kind = ");
    qb.push_bind(kind);
    push_scope_filter(&mut qb, scope);
    qb.push(" ORDER BY id LIMIT ");
    qb.push_bind(i64::from(page.per_page()));
    qb.push(" OFFSET ");
    qb.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    qb
}

pub fn scoped_count_query(kind: &'static str, scope: &OrganizationScope) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) AS total FROM scoped_records WHERE kind = ");
    qb.push_bind(kind);
    push_scope_filter(&mut qb, scope);
    qb
}

#[cfg(test)]
mod tests {
    use shopdesk_core::OrganizationId;

    use super::*;

    #[test]
    fn organization_scope_becomes_where_clause() {
        let scope = OrganizationScope::Organization(OrganizationId::new());
        let qb = scoped_list_query("product", &scope, PageRequest::default());
        assert_eq!(
            qb.sql(),
            "SELECT body FROM scoped_records WHERE kind = $1 AND organization_id = $2 ORDER BY id LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn unrestricted_scope_has_no_organization_filter() {
        let qb = scoped_list_query("order", &OrganizationScope::All, PageRequest::default());
        assert!(!qb.sql().contains("organization_id"));

        let qb = scoped_count_query("order", &OrganizationScope::All);
        assert_eq!(qb.sql(), "SELECT COUNT(*) AS total FROM scoped_records WHERE kind = $1");
    }
}
