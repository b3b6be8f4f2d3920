//! Partner wallet: balance, transactions, KYC-gated withdrawals

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use cellswap_client::{ApiClient, ApiError, KycStatus, Result, User};

use crate::types::{Wallet, WalletTransaction, WithdrawalReceipt};

/// Wallet failures: the client-side KYC gate, or anything the underlying
/// client reports.
#[derive(Debug)]
pub enum WalletError {
    /// Withdrawal refused locally: payouts require an approved KYC.
    KycRequired(KycStatus),
    Api(ApiError),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::KycRequired(status) => {
                write!(f, "withdrawal requires approved KYC (current: {:?})", status)
            }
            WalletError::Api(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WalletError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WalletError::Api(e) => Some(e),
            WalletError::KycRequired(_) => None,
        }
    }
}

impl From<ApiError> for WalletError {
    fn from(e: ApiError) -> Self {
        WalletError::Api(e)
    }
}

pub struct WalletService {
    client: Arc<ApiClient>,
}

impl WalletService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn wallet(&self) -> Result<Wallet> {
        self.client.get("/wallet").await
    }

    pub async fn transactions(&self, limit: u32) -> Result<Vec<WalletTransaction>> {
        self.client
            .get(&format!("/wallet/transactions?limit={}", limit))
            .await
    }

    /// Request a payout. Refused before any network call unless `user` has
    /// an approved KYC; the backend enforces the same rule server-side and
    /// would answer 403.
    pub async fn withdraw(
        &self,
        user: &User,
        amount: i64,
    ) -> std::result::Result<WithdrawalReceipt, WalletError> {
        if user.kyc_status != KycStatus::Approved {
            debug!(status = ?user.kyc_status, "withdrawal blocked by KYC gate");
            return Err(WalletError::KycRequired(user.kyc_status));
        }
        let receipt = self
            .client
            .post(
                "/wallet/withdrawals",
                &serde_json::json!({ "amount": amount }),
            )
            .await?;
        Ok(receipt)
    }
}
