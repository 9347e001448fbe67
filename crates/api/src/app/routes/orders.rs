use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    middleware::from_fn_with_state,
    routing::{get, post},
};
use chrono::Utc;

use shopdesk_auth::{AuthzError, Permission, Principal, organization_scope, target_organization};
use shopdesk_commerce::{NewOrder, Order};
use shopdesk_core::OrganizationId;

use crate::app::dto::{CreateRequest, OrderView, PageQuery};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::load_owned;
use crate::app::services::AppServices;
use crate::envelope::ApiResponse;
use crate::guard::{self, Gates};

pub fn router(gates: &Gates) -> Router {
    let view = || from_fn_with_state(gates.permission(Permission::ViewOrders), guard::permission_gate);
    let manage = || from_fn_with_state(gates.permission(Permission::ManageOrders), guard::permission_gate);

    Router::new()
        .route(
            "/",
            get(list_orders)
                .route_layer(view())
                .merge(post(create_order).route_layer(manage())),
        )
        .route("/:id", get(get_order).route_layer(view()))
        .route("/:id/cancel", post(cancel_order).route_layer(manage()))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<OrderView>>> {
    let Query(query) = query?;
    let scope = organization_scope(&principal)?;
    let page = services.orders.list(scope, query.request()).await?;
    Ok(ApiResponse::paginated(page.map(OrderView::from)))
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<OrderView>> {
    let order = load_owned(services.orders.as_ref(), &principal, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateRequest<NewOrder>>, JsonRejection>,
) -> ApiResult<ApiResponse<OrderView>> {
    let Json(body) = body?;
    let organization_id = target_organization(&principal, body.organization_id)?;
    ensure_products_in_organization(&services, organization_id, &body.record).await?;

    let order = Order::place(organization_id, body.record, Utc::now())?;
    services.orders.insert(order.clone()).await?;

    tracing::info!(
        principal_id = %principal.id(),
        %organization_id,
        order_id = %order.id,
        lines = order.lines.len(),
        "order_created"
    );
    Ok(ApiResponse::created(order.into()))
}

pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<OrderView>> {
    let mut order = load_owned(services.orders.as_ref(), &principal, &id).await?;
    order.cancel(Utc::now())?;
    services.orders.update(order.clone()).await?;

    tracing::info!(principal_id = %principal.id(), order_id = %order.id, "order_cancelled");
    Ok(ApiResponse::ok(order.into()))
}

/// Every order line must reference a product of the order's organization.
async fn ensure_products_in_organization(
    services: &AppServices,
    organization_id: OrganizationId,
    order: &NewOrder,
) -> ApiResult<()> {
    for line in &order.lines {
        let product = services
            .products
            .get(line.product_id)
            .await?
            .ok_or_else(|| ApiError::validation(format!("unknown product {}", line.product_id)))?;
        if product.organization_id != organization_id {
            return Err(AuthzError::WrongTenant.into());
        }
    }
    Ok(())
}
