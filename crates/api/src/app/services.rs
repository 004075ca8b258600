//! In-memory stores behind the demo service, plus the audit log consumer.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use meshguard_audit::AuditEvent;
use meshguard_auth::IdentityContext;
use meshguard_core::{AccessError, AccessResult, UserId};
use meshguard_events::Subscription;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: i64,
    pub name: String,
    pub owner_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct BookingStore {
    next_id: AtomicI64,
    bookings: Mutex<HashMap<i64, Booking>>,
}

impl BookingStore {
    pub fn create(&self, owner: &IdentityContext, req: CreateBookingRequest) -> AccessResult<Booking> {
        let owner_id = owner
            .user_id()
            .ok_or_else(|| AccessError::unauthenticated("Authentication required"))?;

        let booking = Booking {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            name: req.name,
            owner_id,
        };

        self.lock()?.insert(booking.id, booking.clone());
        Ok(booking)
    }

    /// Remove a booking. Only its owner or an admin may cancel it.
    pub fn cancel(&self, id: i64, caller: &IdentityContext) -> AccessResult<Booking> {
        let mut bookings = self.lock()?;
        let booking = bookings
            .get(&id)
            .ok_or_else(|| AccessError::bad_input(format!("Booking not found: {id}")))?;

        let is_owner = caller.user_id() == Some(booking.owner_id);
        let is_admin = caller.role().is_some_and(|r| r.is_admin());
        if !is_owner && !is_admin {
            return Err(AccessError::forbidden(
                "Access denied. You do not have permission to access this resource",
            ));
        }

        bookings
            .remove(&id)
            .ok_or_else(|| AccessError::bad_input(format!("Booking not found: {id}")))
    }

    pub fn get(&self, id: i64) -> AccessResult<Option<Booking>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn lock(&self) -> AccessResult<std::sync::MutexGuard<'_, HashMap<i64, Booking>>> {
        self.bookings
            .lock()
            .map_err(|_| AccessError::internal("booking store lock poisoned"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub restricted: bool,
}

/// Known user accounts. Account management lives elsewhere; this only backs
/// lookups and the restrict switch.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Mutex<HashMap<i64, UserRecord>>,
}

impl UserDirectory {
    pub fn seeded() -> Self {
        let dir = Self::default();
        if let Ok(mut users) = dir.users.lock() {
            for (id, username) in [(1, "admin"), (7, "alice"), (8, "bob")] {
                users.insert(
                    id,
                    UserRecord {
                        id: UserId::new(id),
                        username: username.to_string(),
                        restricted: false,
                    },
                );
            }
        }
        dir
    }

    pub fn get(&self, id: i64) -> AccessResult<UserRecord> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or_else(|| AccessError::bad_input(format!("User not found: {id}")))
    }

    pub fn find_by_username(&self, username: &str) -> AccessResult<UserRecord> {
        self.lock()?
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| AccessError::bad_input(format!("User not found: {username}")))
    }

    pub fn restrict(&self, id: i64) -> AccessResult<UserRecord> {
        let mut users = self.lock()?;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AccessError::bad_input(format!("User not found: {id}")))?;
        user.restricted = true;
        Ok(user.clone())
    }

    fn lock(&self) -> AccessResult<std::sync::MutexGuard<'_, HashMap<i64, UserRecord>>> {
        self.users
            .lock()
            .map_err(|_| AccessError::internal("user directory lock poisoned"))
    }
}

/// Drain audit events into the log until every publisher is gone.
pub fn spawn_audit_logger(events: Subscription<AuditEvent>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while let Ok(envelope) = events.recv() {
            let event = envelope.payload();
            tracing::info!(
                event_id = %envelope.event_id(),
                topic = envelope.topic(),
                user_id = ?event.user_id,
                action = %event.action_type,
                resource = %event.resource_type,
                success = event.success,
                ip = event.ip_address.as_deref().unwrap_or("-"),
                "audit: {}",
                event.description
            );
        }
        tracing::debug!("audit log consumer stopped");
    })
}
