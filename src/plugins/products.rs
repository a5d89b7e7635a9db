//! The in-memory product list and its mutation rules.
//!
//! `ProductListStore` owns the ordered collection and is the only thing that
//! changes it. Every change to the collection is written through the attached
//! `PersistenceGateway`; write failures are logged and otherwise ignored, so
//! the in-memory list stays authoritative for the session.
//!
//! Entry and exit transitions are presentation state. They are kept in a map
//! keyed by product id, carry a deadline, and are advanced explicitly with
//! [`ProductListStore::settle`]. A removal is only final once its deadline has
//! passed and `settle` (or [`ProductListStore::flush`]) runs; dropping the
//! store drops every pending removal with it.

use crate::core::config::ShoplistConfig;
use crate::core::error::ShoplistError;
use crate::core::time::IdGenerator;
use crate::plugins::persistence::PersistenceGateway;
use crate::plugins::product::{Product, compare_names};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Freshly added; the view may animate it in.
    Entering,
    /// Marked for removal; deleted when the deadline passes.
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub until: Instant,
}

/// Lifecycle of a product as seen by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductState {
    Active,
    PendingRemoval,
}

pub struct ProductListStore {
    products: Vec<Product>,
    sorted: bool,
    transitions: HashMap<String, Transition>,
    ids: IdGenerator,
    gateway: Option<PersistenceGateway>,
    removal_grace: Duration,
    entry_transition: Duration,
}

impl Default for ProductListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductListStore {
    /// A store without persistence, using default transition timings.
    pub fn new() -> Self {
        let config = ShoplistConfig::default();
        Self {
            products: Vec::new(),
            sorted: false,
            transitions: HashMap::new(),
            ids: IdGenerator::new(),
            gateway: None,
            removal_grace: config.removal_grace(),
            entry_transition: config.entry_transition(),
        }
    }

    pub fn with_gateway(gateway: PersistenceGateway, config: &ShoplistConfig) -> Self {
        Self {
            gateway: Some(gateway),
            removal_grace: config.removal_grace(),
            entry_transition: config.entry_transition(),
            ..Self::new()
        }
    }

    /// Startup load from the durable slot. Never writes the slot itself.
    ///
    /// An absent, unreadable or invalid slot leaves the collection as it is
    /// (empty at startup); the failure is logged. A payload that fails to
    /// decode is copied aside first, since the next save overwrites it.
    /// Returns the product count.
    pub fn hydrate(&mut self) -> usize {
        let Some(gateway) = &self.gateway else {
            return self.products.len();
        };
        match gateway.load() {
            Ok(Some(products)) => {
                info!(key = gateway.key(), count = products.len(), "loaded product list");
                self.products = products;
                self.transitions.clear();
                self.sorted = false;
            }
            Ok(None) => debug!(key = gateway.key(), "no stored product list"),
            Err(e @ ShoplistError::DecodeError(_)) => {
                warn!(key = gateway.key(), error = %e, "stored product list rejected");
                match gateway.preserve_rejected() {
                    Ok(_) => warn!(backup = %gateway.rejected_key(), "kept rejected payload"),
                    Err(e) => error!(key = gateway.key(), error = %e, "failed to keep rejected payload"),
                }
            }
            Err(e) => warn!(key = gateway.key(), error = %e, "failed to load product list"),
        }
        self.products.len()
    }

    /// Create a product from raw input and put it first.
    ///
    /// On a validation error nothing changes. On success any sort order is
    /// abandoned: the new product goes in front of the current order.
    pub fn add(
        &mut self,
        name: &str,
        price: &str,
        store: &str,
        now: Instant,
    ) -> Result<&Product, ShoplistError> {
        let product = Product::from_input(self.ids.next_id(), name, price, store)?;
        debug!(id = %product.id, name = %product.name, "adding product");
        self.transitions.insert(
            product.id.clone(),
            Transition {
                kind: TransitionKind::Entering,
                until: now + self.entry_transition,
            },
        );
        self.products.insert(0, product);
        self.sorted = false;
        self.persist();
        Ok(&self.products[0])
    }

    /// Mark a product for removal after the grace period.
    ///
    /// Returns false when `id` is unknown or already pending; a repeated
    /// removal keeps the original deadline.
    pub fn remove(&mut self, id: &str, now: Instant) -> bool {
        if self.position(id).is_none() || self.is_pending_removal(id) {
            return false;
        }
        self.transitions.insert(
            id.to_string(),
            Transition {
                kind: TransitionKind::Exiting,
                until: now + self.removal_grace,
            },
        );
        debug!(id, "product pending removal");
        true
    }

    /// Cancel a pending removal. Returns false if nothing was pending.
    pub fn cancel_removal(&mut self, id: &str) -> bool {
        if !self.is_pending_removal(id) {
            return false;
        }
        self.transitions.remove(id);
        debug!(id, "removal cancelled");
        true
    }

    /// Advance transitions to `now`: expired entry marks are dropped and
    /// expired removals are carried out. Returns the ids deleted.
    pub fn settle(&mut self, now: Instant) -> Vec<String> {
        let expired: Vec<(String, TransitionKind)> = self
            .transitions
            .iter()
            .filter(|(_, t)| t.until <= now)
            .map(|(id, t)| (id.clone(), t.kind))
            .collect();

        let mut deleted = Vec::new();
        for (id, kind) in expired {
            self.transitions.remove(&id);
            if kind == TransitionKind::Exiting {
                deleted.push(id);
            }
        }
        self.delete_all(&deleted);
        deleted
    }

    /// Carry out every pending removal immediately and drop all entry marks.
    pub fn flush(&mut self) -> Vec<String> {
        let deleted: Vec<String> = self
            .transitions
            .drain()
            .filter(|(_, t)| t.kind == TransitionKind::Exiting)
            .map(|(id, _)| id)
            .collect();
        self.delete_all(&deleted);
        deleted
    }

    fn delete_all(&mut self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        let before = self.products.len();
        self.products.retain(|p| !ids.contains(&p.id));
        if self.products.len() != before {
            info!(count = before - self.products.len(), "removed products");
            self.persist();
        }
    }

    /// Flip the purchased flag. `None` when `id` is unknown.
    pub fn toggle_purchased(&mut self, id: &str) -> Option<bool> {
        let idx = self.position(id)?;
        let product = &mut self.products[idx];
        product.purchased = !product.purchased;
        let purchased = product.purchased;
        self.persist();
        Some(purchased)
    }

    /// Stable ascending sort by name, locale-aware.
    pub fn sort(&mut self) {
        self.products.sort_by(|a, b| compare_names(&a.name, &b.name));
        self.sorted = true;
        self.persist();
    }

    /// Drop every product and the durable slot.
    pub fn reset(&mut self) {
        self.products.clear();
        self.transitions.clear();
        self.sorted = false;
        if let Some(gateway) = &self.gateway {
            if let Err(e) = gateway.clear() {
                error!(key = gateway.key(), error = %e, "failed to clear product list");
            }
        }
    }

    /// Products whose name contains `query`, ignoring case, in list order.
    pub fn filter(&self, query: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| p.matches(query)).collect()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Set by `sort`, cleared by `add`. Informational only.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn transition(&self, id: &str) -> Option<Transition> {
        self.transitions.get(id).copied()
    }

    pub fn is_pending_removal(&self, id: &str) -> bool {
        self.transitions
            .get(id)
            .is_some_and(|t| t.kind == TransitionKind::Exiting)
    }

    pub fn state(&self, id: &str) -> Option<ProductState> {
        self.get(id)?;
        if self.is_pending_removal(id) {
            Some(ProductState::PendingRemoval)
        } else {
            Some(ProductState::Active)
        }
    }

    pub fn total(&self) -> f64 {
        self.products.iter().map(|p| p.price).sum()
    }

    pub fn remaining_total(&self) -> f64 {
        self.products
            .iter()
            .filter(|p| !p.purchased)
            .map(|p| p.price)
            .sum()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }

    fn persist(&self) {
        let Some(gateway) = &self.gateway else {
            return;
        };
        match gateway.save(&self.products) {
            Ok(()) => debug!(key = gateway.key(), count = self.products.len(), "saved product list"),
            Err(e) => error!(key = gateway.key(), error = %e, "failed to save product list"),
        }
    }
}

/// The three input fields of the add form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub store: String,
}

impl ProductForm {
    pub fn new(name: &str, price: &str, store: &str) -> Self {
        Self {
            name: name.to_string(),
            price: price.to_string(),
            store: store.to_string(),
        }
    }

    /// Add the form's product. Fields are cleared only when the add succeeds.
    pub fn submit(
        &mut self,
        list: &mut ProductListStore,
        now: Instant,
    ) -> Result<String, ShoplistError> {
        let id = list.add(&self.name, &self.price, &self.store, now)?.id.clone();
        self.clear();
        Ok(id)
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.price.clear();
        self.store.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_blank(&self) -> bool {
        self.name.is_empty() && self.price.is_empty() && self.store.is_empty()
    }
}
