//! store.rs: persistence seam for restaurants, tables and feedback.
//!
//! The analytics core never touches this; the service layer fetches record
//! snapshots here and hands them to the engine. `InMemoryStore` backs the
//! service and the tests.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::loyalty::LoyaltyAccount;
use crate::models::{FeedbackRecord, Restaurant, Table};

pub trait FeedbackStore: Send + Sync {
    fn insert_restaurant(&self, r: Restaurant) -> Result<()>;
    fn restaurant(&self, id: &str) -> Result<Option<Restaurant>>;
    fn restaurants_by_owner(&self, owner: &str) -> Result<Vec<Restaurant>>;
    /// Replaces the stored restaurant with the same id; `false` if there is none.
    fn update_restaurant(&self, r: Restaurant) -> Result<bool>;
    /// Removes the restaurant together with its tables and their feedback.
    fn delete_restaurant(&self, id: &str) -> Result<Option<Restaurant>>;

    fn insert_table(&self, t: Table) -> Result<()>;
    fn table(&self, id: &str) -> Result<Option<Table>>;
    fn tables_by_restaurant(&self, restaurant_id: &str) -> Result<Vec<Table>>;
    fn find_table(&self, restaurant_id: &str, table_number: u32) -> Result<Option<Table>>;
    fn update_table(&self, t: Table) -> Result<bool>;
    /// Removes the table and its feedback.
    fn delete_table(&self, id: &str) -> Result<Option<Table>>;

    fn insert_feedback(&self, f: FeedbackRecord) -> Result<()>;
    fn feedback(&self, id: &str) -> Result<Option<FeedbackRecord>>;
    fn feedback_by_table(&self, table_id: &str) -> Result<Vec<FeedbackRecord>>;
    /// Feedback on any of the restaurant's tables, newest first.
    fn feedback_by_restaurant(&self, restaurant_id: &str) -> Result<Vec<FeedbackRecord>>;
    fn update_feedback(&self, f: FeedbackRecord) -> Result<bool>;
    fn delete_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>>;

    fn loyalty(&self, user: &str) -> Result<Option<LoyaltyAccount>>;
    /// Runs `apply` on the user's account (a fresh one if none exists) and
    /// commits only when it succeeds.
    fn update_loyalty(
        &self,
        user: &str,
        apply: &mut dyn FnMut(&mut LoyaltyAccount) -> Result<()>,
    ) -> Result<LoyaltyAccount>;
}

#[derive(Debug, Default)]
struct Inner {
    restaurants: Vec<Restaurant>,
    tables: Vec<Table>,
    feedback: Vec<FeedbackRecord>,
    table_index: HashMap<String, usize>,
    loyalty: HashMap<String, LoyaltyAccount>,
}

impl Inner {
    fn reindex_tables(&mut self) {
        self.table_index = self
            .tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
    }

    fn drop_tables(&mut self, doomed: impl Fn(&Table) -> bool) {
        let removed: Vec<String> = self
            .tables
            .iter()
            .filter(|t| doomed(t))
            .map(|t| t.id.clone())
            .collect();
        if removed.is_empty() {
            return;
        }
        self.tables.retain(|t| !removed.contains(&t.id));
        self.feedback.retain(|f| !removed.contains(&f.table_ref));
        self.reindex_tables();
    }
}

fn replace_by<T>(items: &mut [T], item: T, same: impl Fn(&T) -> bool) -> bool {
    match items.iter_mut().find(|x| same(x)) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => false,
    }
}

/// Insertion-ordered in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| anyhow!("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| anyhow!("store lock poisoned"))
    }
}

impl FeedbackStore for InMemoryStore {
    fn insert_restaurant(&self, r: Restaurant) -> Result<()> {
        self.write()?.restaurants.push(r);
        Ok(())
    }

    fn restaurant(&self, id: &str) -> Result<Option<Restaurant>> {
        Ok(self.read()?.restaurants.iter().find(|r| r.id == id).cloned())
    }

    fn restaurants_by_owner(&self, owner: &str) -> Result<Vec<Restaurant>> {
        Ok(self
            .read()?
            .restaurants
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect())
    }

    fn update_restaurant(&self, r: Restaurant) -> Result<bool> {
        let id = r.id.clone();
        Ok(replace_by(&mut self.write()?.restaurants, r, |x| x.id == id))
    }

    fn delete_restaurant(&self, id: &str) -> Result<Option<Restaurant>> {
        let mut g = self.write()?;
        let Some(pos) = g.restaurants.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = g.restaurants.remove(pos);
        g.drop_tables(|t| t.restaurant == id);
        Ok(Some(removed))
    }

    fn insert_table(&self, t: Table) -> Result<()> {
        let mut g = self.write()?;
        let idx = g.tables.len();
        g.table_index.insert(t.id.clone(), idx);
        g.tables.push(t);
        Ok(())
    }

    fn table(&self, id: &str) -> Result<Option<Table>> {
        let g = self.read()?;
        Ok(g.table_index.get(id).map(|&i| g.tables[i].clone()))
    }

    fn tables_by_restaurant(&self, restaurant_id: &str) -> Result<Vec<Table>> {
        Ok(self
            .read()?
            .tables
            .iter()
            .filter(|t| t.restaurant == restaurant_id)
            .cloned()
            .collect())
    }

    fn find_table(&self, restaurant_id: &str, table_number: u32) -> Result<Option<Table>> {
        Ok(self
            .read()?
            .tables
            .iter()
            .find(|t| t.restaurant == restaurant_id && t.table_number == table_number)
            .cloned())
    }

    fn update_table(&self, t: Table) -> Result<bool> {
        let mut g = self.write()?;
        match g.table_index.get(&t.id).copied() {
            Some(i) => {
                g.tables[i] = t;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_table(&self, id: &str) -> Result<Option<Table>> {
        let mut g = self.write()?;
        let removed = g.table_index.get(id).map(|&i| g.tables[i].clone());
        if removed.is_some() {
            g.drop_tables(|t| t.id == id);
        }
        Ok(removed)
    }

    fn insert_feedback(&self, f: FeedbackRecord) -> Result<()> {
        self.write()?.feedback.push(f);
        Ok(())
    }

    fn feedback(&self, id: &str) -> Result<Option<FeedbackRecord>> {
        Ok(self.read()?.feedback.iter().find(|f| f.id == id).cloned())
    }

    fn feedback_by_table(&self, table_id: &str) -> Result<Vec<FeedbackRecord>> {
        Ok(self
            .read()?
            .feedback
            .iter()
            .filter(|f| f.table_ref == table_id)
            .cloned()
            .collect())
    }

    fn feedback_by_restaurant(&self, restaurant_id: &str) -> Result<Vec<FeedbackRecord>> {
        let g = self.read()?;
        let mut out: Vec<FeedbackRecord> = g
            .feedback
            .iter()
            .filter(|f| {
                g.table_index
                    .get(&f.table_ref)
                    .is_some_and(|&i| g.tables[i].restaurant == restaurant_id)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn update_feedback(&self, f: FeedbackRecord) -> Result<bool> {
        let id = f.id.clone();
        Ok(replace_by(&mut self.write()?.feedback, f, |x| x.id == id))
    }

    fn delete_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>> {
        let mut g = self.write()?;
        Ok(g.feedback
            .iter()
            .position(|f| f.id == id)
            .map(|pos| g.feedback.remove(pos)))
    }

    fn loyalty(&self, user: &str) -> Result<Option<LoyaltyAccount>> {
        Ok(self.read()?.loyalty.get(user).cloned())
    }

    fn update_loyalty(
        &self,
        user: &str,
        apply: &mut dyn FnMut(&mut LoyaltyAccount) -> Result<()>,
    ) -> Result<LoyaltyAccount> {
        let mut g = self.write()?;
        let mut account = g
            .loyalty
            .get(user)
            .cloned()
            .unwrap_or_else(|| LoyaltyAccount::new(user));
        apply(&mut account)?;
        g.loyalty.insert(user.to_string(), account.clone());
        Ok(account)
    }
}
