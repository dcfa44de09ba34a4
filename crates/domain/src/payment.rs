// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Local mirror of a charge held by the payment gateway.

use crate::error::DomainError;
use crate::inscription::PaymentMethod;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Charge status as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    AwaitingRiskAnalysis,
    Confirmed,
    Received,
    ReceivedInCash,
    Overdue,
    RefundRequested,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    /// Returns the stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingRiskAnalysis => "awaiting_risk_analysis",
            Self::Confirmed => "confirmed",
            Self::Received => "received",
            Self::ReceivedInCash => "received_in_cash",
            Self::Overdue => "overdue",
            Self::RefundRequested => "refund_requested",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
        }
    }

    /// Maps a gateway status code (`RECEIVED`, `OVERDUE`, ...) to a status.
    ///
    /// `DELETED` is the gateway's name for a cancelled charge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPaymentStatus` for unknown codes.
    pub fn from_gateway(code: &str) -> Result<Self, DomainError> {
        match code {
            "PENDING" => Ok(Self::Pending),
            "AWAITING_RISK_ANALYSIS" => Ok(Self::AwaitingRiskAnalysis),
            "CONFIRMED" => Ok(Self::Confirmed),
            "RECEIVED" => Ok(Self::Received),
            "RECEIVED_IN_CASH" => Ok(Self::ReceivedInCash),
            "OVERDUE" => Ok(Self::Overdue),
            "REFUND_REQUESTED" => Ok(Self::RefundRequested),
            "REFUNDED" => Ok(Self::Refunded),
            "CANCELLED" | "DELETED" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidPaymentStatus(code.to_string())),
        }
    }

    /// Money has reached (or is guaranteed to reach) the parish.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::Received | Self::ReceivedInCash
        )
    }

    /// The charge will not be paid.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Overdue | Self::Cancelled | Self::Refunded)
    }

    /// The charge can still be paid at the gateway.
    #[must_use]
    pub const fn is_payable(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::AwaitingRiskAnalysis | Self::Overdue
        )
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }

    /// Checks whether the mirror may move from this status to `target`.
    ///
    /// Terminal statuses never move. Settled statuses only move to another
    /// settled status or into the refund flow. A refund request either
    /// completes or is withdrawn back to a settled status.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if self.is_settled() {
            return target.is_settled()
                || matches!(target, Self::RefundRequested | Self::Refunded);
        }
        if matches!(self, Self::RefundRequested) {
            return target.is_settled() || matches!(target, Self::Refunded);
        }
        true
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "awaiting_risk_analysis" => Ok(Self::AwaitingRiskAnalysis),
            "confirmed" => Ok(Self::Confirmed),
            "received" => Ok(Self::Received),
            "received_in_cash" => Ok(Self::ReceivedInCash),
            "overdue" => Ok(Self::Overdue),
            "refund_requested" => Ok(Self::RefundRequested),
            "refunded" => Ok(Self::Refunded),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

/// Stored attributes of a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentParts {
    pub id: String,
    pub event_id: String,
    pub inscription_id: String,
    pub external_payment_id: String,
    pub status: PaymentStatus,
    pub amount: Money,
    pub method: PaymentMethod,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A charge linked to an inscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    id: String,
    event_id: String,
    inscription_id: String,
    external_payment_id: String,
    status: PaymentStatus,
    amount: Money,
    method: PaymentMethod,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Payment {
    #[must_use]
    pub fn from_parts(parts: PaymentParts) -> Self {
        Self {
            id: parts.id,
            event_id: parts.event_id,
            inscription_id: parts.inscription_id,
            external_payment_id: parts.external_payment_id,
            status: parts.status,
            amount: parts.amount,
            method: parts.method,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    #[must_use]
    pub fn inscription_id(&self) -> &str {
        &self.inscription_id
    }

    #[must_use]
    pub fn external_payment_id(&self) -> &str {
        &self.external_payment_id
    }

    #[must_use]
    pub const fn status(&self) -> PaymentStatus {
        self.status
    }

    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        self.method
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Mirrors a status reported by the gateway.
    ///
    /// Returns `Ok(false)` when the status is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPaymentTransition` if the move would
    /// regress from a terminal or settled status.
    pub fn mirror_status(
        &mut self,
        status: PaymentStatus,
        now: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        if status == self.status {
            return Ok(false);
        }
        if !self.status.can_transition_to(status) {
            return Err(DomainError::InvalidPaymentTransition {
                payment_id: self.id.clone(),
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        self.status = status;
        self.updated_at = now;
        Ok(true)
    }
}
