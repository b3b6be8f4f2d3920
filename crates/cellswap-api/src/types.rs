//! Wire types for the marketplace API
//!
//! Field names follow the backend's camelCase JSON; enum values travel as
//! snake_case strings. Monetary amounts are integer minor units (paise).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceModel {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub release_year: Option<u16>,
    /// Launch-condition base price, minor units.
    pub base_price: i64,
}

/// One question in the condition assessment flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<ConditionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionOption {
    pub id: String,
    pub label: String,
    /// Deduction from the base price when this option is chosen, minor units.
    pub deduction: i64,
}

/// A priced offer for a device in a stated condition. Quotes expire; the
/// backend rejects listing creation against a stale `quote_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub quote_id: String,
    pub model_id: String,
    pub amount: i64,
    pub currency: String,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Scheduled,
    Completed,
    Cancelled,
}

/// A customer's trade-in listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub quote_id: String,
    pub model_name: String,
    pub amount: i64,
    pub status: ListingStatus,
    pub pickup_address: String,
    pub pickup_slot: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Open,
    Claimed,
    Visited,
    Completed,
    Disputed,
    Cancelled,
}

/// A listing as seen from the partner side: claimable work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub listing_id: String,
    pub model_name: String,
    pub quoted_amount: i64,
    pub status: LeadStatus,
    pub area: Option<String>,
    pub claimed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub balance: i64,
    pub pending: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: String,
    pub amount: i64,
    pub kind: TransactionKind,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Requested,
    Processing,
    Paid,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReceipt {
    pub id: String,
    pub amount: i64,
    pub status: WithdrawalStatus,
}

/// Document references for a KYC submission. Media is uploaded first
/// through [`crate::MediaService`]; only object keys travel here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmission {
    pub document_type: String,
    pub front_key: String,
    pub back_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    UnderReview,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: String,
    pub lead_id: String,
    pub reason: String,
    pub status: DisputeStatus,
    pub created_at: DateTime<Utc>,
}
