//! Typed services for the Cellswap trade-in marketplace API
//!
//! One service struct per backend resource, each a thin layer over
//! [`cellswap_client::ApiClient`]: catalog browsing and price quotes
//! (cached), customer listings, partner leads, wallet and withdrawals
//! (KYC-gated), KYC submission, disputes, and presigned media uploads.

mod catalog;
mod disputes;
mod kyc;
mod leads;
mod listings;
mod media;
mod types;
mod wallet;

pub use catalog::{CatalogService, QuoteAnswer};
pub use disputes::DisputeService;
pub use kyc::KycService;
pub use leads::LeadsService;
pub use listings::ListingsService;
pub use media::{MediaService, PresignedUpload};
pub use types::*;
pub use wallet::{WalletError, WalletService};

pub use cellswap_client::{ApiClient, ApiError, KycStatus, Result, User, UserRole};
