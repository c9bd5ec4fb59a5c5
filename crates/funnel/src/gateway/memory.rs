//! In-process gateway for tests.
//!
//! Tables live behind mutexes, the phone column is unique, and any
//! operation can be made to fail on demand.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use prize_funnel_core::{Credential, Identity, OrderId, OrderStatus};

use super::rows::{FeedbackRow, NewFeedbackRow, NewOrderRow, OrderRow, ShippingPatch, UserRow};
use super::{GatewayError, PersistenceGateway, UNIQUE_VIOLATION};

/// Gateway operations, for counting calls and injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    InsertUser,
    FindUser,
    InsertOrder,
    LatestOrder,
    ListOrders,
    FindOrder,
    UpdateOrder,
    InsertFeedback,
    LatestFeedback,
}

#[derive(Default)]
struct Tables {
    users: Vec<Credential>,
    orders: Vec<OrderRow>,
    feedbacks: Vec<FeedbackRow>,
    next_order_id: i64,
}

/// Gateway backed by in-memory tables.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<GatewayOp>>,
    fail_all: AtomicBool,
    calls: Mutex<HashMap<GatewayOp, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make one operation fail until [`MemoryGateway::recover`].
    pub fn fail(&self, op: GatewayOp) {
        lock(&self.failing).insert(op);
    }

    /// Make every operation fail, like an outage.
    pub fn fail_everything(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Clear all injected failures.
    pub fn recover(&self) {
        lock(&self.failing).clear();
        self.fail_all.store(false, Ordering::SeqCst);
    }

    /// Number of calls made to one operation, failed calls included.
    #[must_use]
    pub fn calls(&self, op: GatewayOp) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    /// Number of calls made to any operation.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    /// Snapshot of the `app_users` table.
    #[must_use]
    pub fn users(&self) -> Vec<Credential> {
        lock(&self.tables).users.clone()
    }

    /// Snapshot of the `orders` table, in insertion order.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRow> {
        lock(&self.tables).orders.clone()
    }

    /// Snapshot of the `feedbacks` table, in insertion order.
    #[must_use]
    pub fn feedbacks(&self) -> Vec<FeedbackRow> {
        lock(&self.tables).feedbacks.clone()
    }

    /// Change an order's status out of band, as the back office would.
    ///
    /// Returns `false` if no such order exists.
    pub fn set_order_status(&self, id: OrderId, status: OrderStatus) -> bool {
        let mut tables = lock(&self.tables);
        let Some(row) = tables.orders.iter_mut().find(|r| r.id == id.as_i64()) else {
            return false;
        };
        row.status = Some(status.to_string());
        true
    }

    fn enter(&self, op: GatewayOp) -> Result<(), GatewayError> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;

        if self.fail_all.load(Ordering::SeqCst) || lock(&self.failing).contains(&op) {
            return Err(GatewayError::Api {
                status: 503,
                code: None,
                message: format!("injected failure for {op:?}"),
            });
        }
        Ok(())
    }

    fn orders_newest_first(tables: &Tables, identity: &Identity) -> Vec<OrderRow> {
        let mut rows: Vec<OrderRow> = tables
            .orders
            .iter()
            .filter(|r| r.name == identity.as_str())
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn insert_user(&self, credential: &Credential) -> Result<(), GatewayError> {
        self.enter(GatewayOp::InsertUser)?;
        let mut tables = lock(&self.tables);

        if tables
            .users
            .iter()
            .any(|u| u.identity() == credential.identity())
        {
            return Err(GatewayError::Conflict(format!(
                "duplicate key value violates unique constraint ({UNIQUE_VIOLATION})"
            )));
        }
        tables.users.push(credential.clone());
        Ok(())
    }

    async fn find_user(&self, credential: &Credential) -> Result<Option<UserRow>, GatewayError> {
        self.enter(GatewayOp::FindUser)?;
        let tables = lock(&self.tables);

        Ok(tables
            .users
            .iter()
            .find(|&u| u == credential)
            .map(|u| UserRow {
                phone: u.identity().as_str().to_owned(),
            }))
    }

    async fn insert_order(&self, order: &NewOrderRow) -> Result<OrderRow, GatewayError> {
        self.enter(GatewayOp::InsertOrder)?;
        let mut tables = lock(&self.tables);

        tables.next_order_id += 1;
        let row = OrderRow {
            id: tables.next_order_id,
            order_no: Some(order.order_no.clone()),
            name: order.name.clone(),
            prize: Some(order.prize.clone()),
            status: Some(order.status.clone()),
            shipping: order.shipping.clone(),
            rejection_reason: None,
            carrier: None,
            tracking_no: None,
            ship_date: None,
            created_at: Utc::now(),
        };
        tables.orders.push(row.clone());
        Ok(row)
    }

    async fn latest_order(&self, identity: &Identity) -> Result<Option<OrderRow>, GatewayError> {
        self.enter(GatewayOp::LatestOrder)?;
        let tables = lock(&self.tables);
        Ok(Self::orders_newest_first(&tables, identity)
            .into_iter()
            .next())
    }

    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderRow>, GatewayError> {
        self.enter(GatewayOp::ListOrders)?;
        let tables = lock(&self.tables);
        Ok(Self::orders_newest_first(&tables, identity))
    }

    async fn find_order(
        &self,
        identity: &Identity,
        id: OrderId,
    ) -> Result<Option<OrderRow>, GatewayError> {
        self.enter(GatewayOp::FindOrder)?;
        let tables = lock(&self.tables);
        Ok(tables
            .orders
            .iter()
            .find(|r| r.id == id.as_i64() && r.name == identity.as_str())
            .cloned())
    }

    async fn update_order(
        &self,
        id: OrderId,
        patch: &ShippingPatch,
    ) -> Result<OrderRow, GatewayError> {
        self.enter(GatewayOp::UpdateOrder)?;
        let mut tables = lock(&self.tables);

        let row = tables
            .orders
            .iter_mut()
            .find(|r| r.id == id.as_i64())
            .ok_or_else(|| GatewayError::DataCorruption("orders write returned no rows".to_string()))?;
        row.status = Some(patch.status.clone());
        row.shipping = patch.shipping.clone();
        Ok(row.clone())
    }

    async fn insert_feedback(
        &self,
        feedback: &NewFeedbackRow,
    ) -> Result<FeedbackRow, GatewayError> {
        self.enter(GatewayOp::InsertFeedback)?;
        let mut tables = lock(&self.tables);

        let row = FeedbackRow {
            phone: Some(feedback.phone.clone()),
            user: feedback.user.clone(),
            rating: feedback.rating,
            comment: Some(feedback.comment.clone()),
            date: Some(feedback.date.clone()),
            created_at: Some(Utc::now()),
        };
        tables.feedbacks.push(row.clone());
        Ok(row)
    }

    async fn latest_feedback(
        &self,
        identity: &Identity,
    ) -> Result<Option<FeedbackRow>, GatewayError> {
        self.enter(GatewayOp::LatestFeedback)?;
        let tables = lock(&self.tables);
        Ok(tables
            .feedbacks
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user == identity.as_str())
            .max_by_key(|(index, r)| (r.created_at, *index))
            .map(|(_, r)| r.clone()))
    }
}
