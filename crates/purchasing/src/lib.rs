//! Purchasing domain module: vendor routing, purchase orders, goods receipt.
//!
//! This crate contains business rules for purchasing, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Receiving goods is
//! the one place it touches the inventory ledger.

pub mod cart;
pub mod order;
pub mod vendor;

pub use cart::{group_cart_by_vendor, CartLine, VendorBatch};
pub use order::{OrderBook, OrderLine, OrderStatus, PurchaseOrder, ReceiptOutcome};
pub use vendor::{VendorContact, VendorDirectory, VendorRule};
