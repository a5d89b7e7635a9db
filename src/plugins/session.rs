//! One open shopping list: the store, its gateway and the command surface.
//!
//! Commands produce JSON envelopes (`ts`, `cmd`, `status`, ...). Text output
//! is rendered from the same envelopes.

use crate::core::config::ShoplistConfig;
use crate::core::error::ShoplistError;
use crate::core::storage::MemoryStorage;
use crate::core::store::Store;
use crate::core::time::command_envelope;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::persistence::PersistenceGateway;
use crate::plugins::product::Product;
use crate::plugins::products::{ProductForm, ProductListStore, TransitionKind};
use clap::{Subcommand, ValueEnum};
use serde_json::Value as JsonValue;
use std::time::Instant;
use tracing::error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ListCommand {
    /// Add a product to the top of the list.
    Add {
        /// Product name.
        name: String,
        /// Price; `4,99` and `4.99` are both accepted.
        price: String,
        /// Store to buy it in.
        store: String,
    },
    /// Show the list, optionally filtered by name.
    List {
        /// Case-insensitive name substring.
        #[clap(long, default_value = "")]
        filter: String,
    },
    /// Toggle a product between "to buy" and "purchased".
    Toggle {
        /// Product id.
        id: String,
    },
    /// Remove a product.
    Remove {
        /// Product id.
        id: String,
    },
    /// Sort the list alphabetically by name.
    Sort,
    /// Delete every product and the stored list.
    Reset,
}

pub struct Session {
    list: ProductListStore,
    config: ShoplistConfig,
}

impl Session {
    /// Open the store's durable slot and load it.
    ///
    /// A slot that cannot be opened is logged and replaced by an in-memory
    /// one; the session still runs, it just does not survive the process.
    pub fn open(store: &Store, config: &ShoplistConfig) -> Self {
        let storage = match store.open_storage(config) {
            Ok(storage) => storage,
            Err(e) => {
                error!(root = %store.root.display(), error = %e, "cannot open product storage, changes will not be saved");
                Box::new(MemoryStorage::new())
            }
        };
        let gateway = PersistenceGateway::new(storage, config.storage_key.clone());
        let mut list = ProductListStore::with_gateway(gateway, config);
        list.hydrate();
        Self {
            list,
            config: config.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(list: ProductListStore, config: ShoplistConfig) -> Self {
        Self { list, config }
    }

    pub fn list(&self) -> &ProductListStore {
        &self.list
    }

    /// Run one command. Validation failures come back as an `invalid`
    /// envelope, unknown ids as `not_found`.
    pub fn execute(&mut self, cmd: &ListCommand, now: Instant) -> JsonValue {
        match cmd {
            ListCommand::Add { name, price, store } => {
                let mut form = ProductForm::new(name, price, store);
                match form.submit(&mut self.list, now) {
                    Ok(id) => {
                        let item = self.list.get(&id).map(|p| self.item_json(p));
                        command_envelope(
                            "add",
                            "ok",
                            serde_json::json!({ "id": id, "item": item, "count": self.list.len() }),
                        )
                    }
                    Err(ShoplistError::ValidationError(message)) => command_envelope(
                        "add",
                        "invalid",
                        serde_json::json!({ "message": message }),
                    ),
                    Err(e) => command_envelope(
                        "add",
                        "error",
                        serde_json::json!({ "message": e.to_string() }),
                    ),
                }
            }
            ListCommand::List { filter } => self.list_envelope("list", filter),
            ListCommand::Toggle { id } => match self.list.toggle_purchased(id) {
                Some(purchased) => command_envelope(
                    "toggle",
                    "ok",
                    serde_json::json!({ "id": id, "purchased": purchased }),
                ),
                None => not_found("toggle", id),
            },
            ListCommand::Remove { id } => {
                if self.list.remove(id, now) {
                    command_envelope(
                        "remove",
                        "ok",
                        serde_json::json!({
                            "id": id,
                            "grace_ms": self.config.removal_grace_ms,
                        }),
                    )
                } else if self.list.is_pending_removal(id) {
                    command_envelope("remove", "pending", serde_json::json!({ "id": id }))
                } else {
                    not_found("remove", id)
                }
            }
            ListCommand::Sort => {
                self.list.sort();
                command_envelope(
                    "sort",
                    "ok",
                    serde_json::json!({ "sorted": true, "count": self.list.len() }),
                )
            }
            ListCommand::Reset => {
                let dropped = self.list.len();
                self.list.reset();
                command_envelope("reset", "ok", serde_json::json!({ "dropped": dropped }))
            }
        }
    }

    pub fn undo_remove(&mut self, id: &str) -> JsonValue {
        if self.list.cancel_removal(id) {
            command_envelope("undo-remove", "ok", serde_json::json!({ "id": id }))
        } else {
            not_found("undo-remove", id)
        }
    }

    pub fn settle(&mut self, now: Instant) -> Vec<String> {
        self.list.settle(now)
    }

    /// Finish pending removals before the session goes away.
    pub fn close(&mut self) -> Vec<String> {
        self.list.flush()
    }

    pub fn list_envelope(&self, cmd: &str, filter: &str) -> JsonValue {
        let items: Vec<JsonValue> = self
            .list
            .filter(filter)
            .into_iter()
            .map(|p| self.item_json(p))
            .collect();
        command_envelope(
            cmd,
            "ok",
            serde_json::json!({
                "filter": filter,
                "sorted": self.list.is_sorted(),
                "count": items.len(),
                "items": items,
                "total": self.list.total(),
                "remaining_total": self.list.remaining_total(),
            }),
        )
    }

    fn item_json(&self, product: &Product) -> JsonValue {
        let state = match self.list.transition(&product.id).map(|t| t.kind) {
            Some(TransitionKind::Exiting) => "pending_removal",
            Some(TransitionKind::Entering) => "entering",
            None => "active",
        };
        serde_json::json!({
            "id": product.id,
            "name": product.name,
            "price": product.price,
            "store": product.store,
            "purchased": product.purchased,
            "state": state,
        })
    }

    /// Render an envelope for the terminal.
    pub fn render(&self, out: &JsonValue, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(out).unwrap_or_else(|_| out.to_string())
            }
            OutputFormat::Text => render_text(out, &self.config.currency),
        }
    }
}

fn not_found(cmd: &str, id: &str) -> JsonValue {
    command_envelope(cmd, "not_found", serde_json::json!({ "id": id }))
}

fn render_text(out: &JsonValue, currency: &str) -> String {
    let cmd = out.get("cmd").and_then(|x| x.as_str()).unwrap_or("");
    let status = out.get("status").and_then(|x| x.as_str()).unwrap_or("");
    let id = out.get("id").and_then(|x| x.as_str()).unwrap_or("?");

    match (cmd, status) {
        ("list" | "filter", _) => tui::render_list(out, currency),
        ("add", "ok") => {
            let row = out
                .get("item")
                .map(|item| tui::render_product_row(item, currency))
                .unwrap_or_default();
            tui::render_status(ItemStatus::Added, &row)
        }
        ("add", _) => {
            let message = out.get("message").and_then(|x| x.as_str()).unwrap_or("");
            tui::render_alert("Error", message)
        }
        ("toggle", "ok") => {
            let purchased = out.get("purchased").and_then(|x| x.as_bool()) == Some(true);
            let label = if purchased { "purchased" } else { "to buy" };
            tui::render_status(ItemStatus::Updated, &format!("{} is now {}", id, label))
        }
        ("remove", "ok") => tui::render_status(ItemStatus::Removed, &format!("removing {}", id)),
        ("remove", "pending") => {
            tui::render_status(ItemStatus::Info, &format!("{} is already being removed", id))
        }
        ("undo-remove", "ok") => {
            tui::render_status(ItemStatus::Updated, &format!("kept {}", id))
        }
        ("sort", _) => tui::render_status(ItemStatus::Updated, "sorted by name"),
        ("reset", _) => {
            let dropped = out.get("dropped").and_then(|x| x.as_u64()).unwrap_or(0);
            tui::render_status(ItemStatus::Removed, &format!("dropped {} products", dropped))
        }
        (_, "not_found") => tui::render_status(ItemStatus::Missing, &format!("no product {}", id)),
        _ => out.to_string(),
    }
}
