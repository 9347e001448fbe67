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
use shopdesk_commerce::{Invoice, NewInvoice};

use crate::app::dto::{CreateRequest, PageQuery};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::load_owned;
use crate::app::services::AppServices;
use crate::envelope::ApiResponse;
use crate::guard::{self, Gates};

/// Accounting routes, nested under `/accounting`.
pub fn router(gates: &Gates) -> Router {
    let view = || from_fn_with_state(gates.permission(Permission::ViewAccounting), guard::permission_gate);
    let manage = || from_fn_with_state(gates.permission(Permission::ManageAccounting), guard::permission_gate);

    Router::new()
        .route(
            "/invoices",
            get(list_invoices)
                .route_layer(view())
                .merge(post(create_invoice).route_layer(manage())),
        )
        .route("/invoices/:id", get(get_invoice).route_layer(view()))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<Invoice>>> {
    let Query(query) = query?;
    let scope = organization_scope(&principal)?;
    let page = services.invoices.list(scope, query.request()).await?;
    Ok(ApiResponse::paginated(page))
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Invoice>> {
    let invoice = load_owned(services.invoices.as_ref(), &principal, &id).await?;
    Ok(ApiResponse::ok(invoice))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateRequest<NewInvoice>>, JsonRejection>,
) -> ApiResult<ApiResponse<Invoice>> {
    let Json(body) = body?;
    let organization_id = target_organization(&principal, body.organization_id)?;

    if let Some(order_id) = body.record.order_id {
        let order = services
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| ApiError::validation(format!("unknown order {order_id}")))?;
        if order.organization_id != organization_id {
            return Err(AuthzError::WrongTenant.into());
        }
    }

    let invoice = Invoice::issue(organization_id, body.record, Utc::now())?;
    services.invoices.insert(invoice.clone()).await?;

    tracing::info!(
        principal_id = %principal.id(),
        %organization_id,
        invoice_id = %invoice.id,
        number = %invoice.number,
        "invoice_issued"
    );
    Ok(ApiResponse::created(invoice))
}
