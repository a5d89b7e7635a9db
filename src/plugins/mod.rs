//! The shopping list itself: products, the list store, persistence and the
//! command surfaces built on them.

pub mod persistence;
pub mod product;
pub mod products;
pub mod session;
pub mod shell;
