use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};
use chrono::Utc;

use shopdesk_auth::{Permission, Principal, organization_scope, target_organization};
use shopdesk_commerce::{NewProduct, Product, ProductUpdate};

use crate::app::dto::{CreateRequest, PageQuery};
use crate::app::errors::ApiResult;
use crate::app::routes::load_owned;
use crate::app::services::AppServices;
use crate::envelope::ApiResponse;
use crate::guard::{self, Gates};

pub fn router(gates: &Gates) -> Router {
    let view = || from_fn_with_state(gates.permission(Permission::ViewInventory), guard::permission_gate);
    let manage = || from_fn_with_state(gates.permission(Permission::ManageInventory), guard::permission_gate);

    Router::new()
        .route(
            "/",
            get(list_products)
                .route_layer(view())
                .merge(post(create_product).route_layer(manage())),
        )
        .route(
            "/:id",
            get(get_product).route_layer(view()).merge(
                patch(update_product)
                    .merge(delete(delete_product))
                    .route_layer(manage()),
            ),
        )
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<Product>>> {
    let Query(query) = query?;
    let scope = organization_scope(&principal)?;
    let page = services.products.list(scope, query.request()).await?;
    Ok(ApiResponse::paginated(page))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Product>> {
    let product = load_owned(services.products.as_ref(), &principal, &id).await?;
    Ok(ApiResponse::ok(product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateRequest<NewProduct>>, JsonRejection>,
) -> ApiResult<ApiResponse<Product>> {
    let Json(body) = body?;
    let organization_id = target_organization(&principal, body.organization_id)?;
    let product = Product::create(organization_id, body.record, Utc::now())?;
    services.products.insert(product.clone()).await?;

    tracing::info!(
        principal_id = %principal.id(),
        %organization_id,
        product_id = %product.id,
        sku = %product.sku,
        "product_created"
    );
    Ok(ApiResponse::created(product))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<ProductUpdate>, JsonRejection>,
) -> ApiResult<ApiResponse<Product>> {
    let Json(update) = body?;
    let mut product = load_owned(services.products.as_ref(), &principal, &id).await?;
    product.apply_update(update, Utc::now())?;
    services.products.update(product.clone()).await?;

    tracing::info!(principal_id = %principal.id(), product_id = %product.id, "product_updated");
    Ok(ApiResponse::ok(product))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Product>> {
    let product = load_owned(services.products.as_ref(), &principal, &id).await?;
    services.products.delete(product.id).await?;

    tracing::info!(principal_id = %principal.id(), product_id = %product.id, "product_deleted");
    Ok(ApiResponse::ok(product))
}
