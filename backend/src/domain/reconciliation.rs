//! Payment reconciliation for the project tracker.
//!
//! Turns a project's raw payment events into the facturado/pagado/saldo
//! ledger. The ledger is never stored; callers recompute it from the full
//! event list on every use, so stored aggregates can never drift from the
//! events. All three outputs are clamped to zero: an overpaid project
//! reports `saldo == 0`, not a negative balance, which means
//! `facturado - pagado == saldo` must not be assumed.

use shared::{BudgetPosition, Payment, PaymentKind, PaymentSummary};

/// Reconcile a single project's payment events.
///
/// Amounts are summed as given; a negative amount on a non-correcting kind
/// is a data-entry problem, not something this function validates. An empty
/// list yields all zeros.
pub fn reconcile(payments: &[Payment]) -> PaymentSummary {
    let mut invoice = 0i64;
    let mut advance = 0i64;
    let mut payment = 0i64;
    let mut credit_note = 0i64;
    let mut refund = 0i64;

    for event in payments {
        match event.kind {
            PaymentKind::Invoice => invoice += event.amount,
            PaymentKind::Advance => advance += event.amount,
            PaymentKind::Payment => payment += event.amount,
            PaymentKind::CreditNote => credit_note += event.amount,
            PaymentKind::Refund => refund += event.amount,
        }
    }

    let facturado = (invoice - credit_note).max(0);
    let pagado = (payment + advance - refund).max(0);
    let saldo = (facturado - pagado).max(0);

    PaymentSummary {
        facturado,
        pagado,
        saldo,
    }
}

/// Position of the reconciled ledger against the project budget, shown on
/// the payments board ("Por facturar" / "Saldo por cobrar").
pub fn budget_position(budget: i64, summary: &PaymentSummary) -> BudgetPosition {
    BudgetPosition {
        por_facturar: (budget - summary.facturado).max(0),
        por_cobrar: summary.saldo,
    }
}
