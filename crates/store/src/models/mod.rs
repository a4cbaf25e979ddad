//! Domain models for the store core.
//!
//! These are the typed records constructed at the storage boundary; nothing
//! above `db/` touches raw rows.

pub mod cart;
pub mod order;

pub use cart::{Cart, CartLine, CartLineDetail, CartTotal};
pub use order::{Order, OrderLine};
