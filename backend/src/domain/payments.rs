//! Payment event CRUD.
//!
//! Payments are immutable facts from the reconciliation's point of view:
//! the derived totals are never stored, only the events themselves.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use shared::{CreatePaymentRequest, Payment, PaymentPatch, PaymentSummary};
use tracing::info;
use uuid::Uuid;

use super::reconciliation::reconcile;
use crate::storage::{PaymentStorage, StoreError};

/// Service handling payment event persistence.
pub struct PaymentService<S> {
    store: Arc<S>,
}

impl<S> PaymentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: PaymentStorage> PaymentService<S> {
    /// Record a payment event, minting its id and creation timestamp.
    pub fn create_payment(&self, request: CreatePaymentRequest) -> Result<Payment> {
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            project_id: request.project_id,
            kind: request.kind,
            amount: request.amount,
            event_date: request.event_date,
            reference: request.reference,
            note: request.note,
            currency: request.currency,
            created_at: Utc::now().to_rfc3339(),
        };
        self.store.store_payment(&payment)?;
        info!(
            "recorded {} of {} for project {}",
            payment.kind.label(),
            payment.amount,
            payment.project_id
        );
        Ok(payment)
    }

    pub fn get_payment(&self, payment_id: &str) -> Result<Payment> {
        self.store
            .get_payment(payment_id)?
            .ok_or_else(|| StoreError::NotFound("payment").into())
    }

    /// Payments of one project, event date descending.
    pub fn list_payments(&self, project_id: &str) -> Result<Vec<Payment>> {
        self.store.list_payments(project_id)
    }

    pub fn list_all_payments(&self) -> Result<Vec<Payment>> {
        self.store.list_all_payments()
    }

    /// Apply a partial update. Absent fields are left untouched.
    pub fn update_payment(&self, payment_id: &str, patch: PaymentPatch) -> Result<Payment> {
        let mut payment = self.get_payment(payment_id)?;
        if let Some(kind) = patch.kind {
            payment.kind = kind;
        }
        if let Some(amount) = patch.amount {
            payment.amount = amount;
        }
        if let Some(event_date) = patch.event_date {
            payment.event_date = event_date;
        }
        if let Some(reference) = patch.reference {
            payment.reference = Some(reference);
        }
        if let Some(note) = patch.note {
            payment.note = Some(note);
        }
        self.store.update_payment(&payment)?;
        Ok(payment)
    }

    pub fn delete_payment(&self, payment_id: &str) -> Result<()> {
        if !self.store.delete_payment(payment_id)? {
            return Err(StoreError::NotFound("payment").into());
        }
        info!("deleted payment {payment_id}");
        Ok(())
    }

    /// Reconciled totals for one project, recomputed from the full event
    /// list on every call.
    pub fn project_summary(&self, project_id: &str) -> Result<PaymentSummary> {
        let payments = self.list_payments(project_id)?;
        Ok(reconcile(&payments))
    }
}
