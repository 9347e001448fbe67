//! Back-office records scoped to an organization.
//!
//! Plain data plus validation: no IO, no HTTP, no authorization. Callers
//! decide *who* may create or change a record; this crate decides whether the
//! change itself is valid.

pub mod invoice;
pub mod order;
pub mod product;

pub use invoice::{Invoice, NewInvoice};
pub use order::{NewOrder, Order, OrderLine, OrderStatus};
pub use product::{NewProduct, Product, ProductUpdate};
