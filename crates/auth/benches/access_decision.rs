use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use shopdesk_auth::{
    AccessPolicy, Permission, Principal, PrincipalId, Role, StaffRole, organization_scope,
    validate_organization_access,
};
use shopdesk_core::OrganizationId;

fn bench_require_permission(c: &mut Criterion) {
    let mut group = c.benchmark_group("require_permission");
    group.sample_size(1000);

    let policy = AccessPolicy::default();
    let org = OrganizationId::new();
    let principals = [
        ("super_admin", Principal::super_admin(PrincipalId::new())),
        ("tenant_admin", Principal::tenant_admin(PrincipalId::new(), org)),
        ("staff_accountant", Principal::staff(PrincipalId::new(), org, Some(StaffRole::Accountant))),
        ("staff_sales", Principal::staff(PrincipalId::new(), org, Some(StaffRole::SalesExecutive))),
        ("customer", Principal::customer(PrincipalId::new(), org)),
    ];

    for (name, principal) in &principals {
        group.bench_with_input(BenchmarkId::from_parameter(name), principal, |b, p| {
            b.iter(|| {
                for perm in Permission::ALL {
                    let _ = black_box(policy.require_permission(black_box(p), perm));
                }
            });
        });
    }

    group.finish();
}

fn bench_role_and_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("gates");

    let policy = AccessPolicy::default();
    let org = OrganizationId::new();
    let other = OrganizationId::new();
    let staff = Principal::staff(PrincipalId::new(), org, Some(StaffRole::Cashier));

    group.bench_function("require_role_miss", |b| {
        b.iter(|| policy.require_role(black_box(&staff), &[Role::SuperAdmin, Role::TenantAdmin]))
    });

    group.bench_function("scope_and_validate", |b| {
        b.iter(|| {
            let _ = black_box(organization_scope(black_box(&staff)));
            let _ = black_box(validate_organization_access(black_box(&staff), other));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_require_permission, bench_role_and_scope);
criterion_main!(benches);
