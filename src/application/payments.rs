use crate::domain::payment::Payment;
use crate::domain::policy;
use crate::domain::ports::{
    ContractStoreRef, PaymentGatewayRef, PaymentStoreRef, VerificationStoreRef,
};
use crate::error::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

/// Currency all premiums settle in today.
const SETTLEMENT_CURRENCY: &str = "RUB";

/// Outcome of a payment initiation. A declined payment is an expected
/// business result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Confirmed { payment_id: Uuid, transaction_id: String },
    Declined { error: String },
}

/// Coordinates payment initiation: records the payment, calls the gateway,
/// and applies the contract-side effects of a confirmed payment.
pub struct PaymentService {
    payments: PaymentStoreRef,
    contracts: ContractStoreRef,
    gateway: PaymentGatewayRef,
    verifications: VerificationStoreRef,
}

impl PaymentService {
    pub fn new(
        payments: PaymentStoreRef,
        contracts: ContractStoreRef,
        gateway: PaymentGatewayRef,
        verifications: VerificationStoreRef,
    ) -> Self {
        Self {
            payments,
            contracts,
            gateway,
            verifications,
        }
    }

    /// Runs the full payment sequence. There is no compensation between the
    /// persisted steps: a crash mid-sequence can leave a Payment in
    /// Processing with no contract update.
    pub async fn initiate_payment(
        &self,
        contract_id: Uuid,
        amount: Decimal,
    ) -> Result<PaymentOutcome> {
        let Some(mut contract) = self.contracts.get(contract_id).await? else {
            return Ok(PaymentOutcome::Declined {
                error: "Contract not found".to_string(),
            });
        };

        let mut payment = Payment::new(contract_id, amount, SETTLEMENT_CURRENCY, None)?;
        // The gateway idempotency key is the payment's own id.
        let idempotency_key = payment.id().to_string();
        self.payments.store(payment.clone()).await?;

        payment.mark_processing()?;
        self.payments.store(payment.clone()).await?;

        let response = self
            .gateway
            .process_payment(amount, SETTLEMENT_CURRENCY, &idempotency_key)
            .await?;

        if !response.success {
            let error = response.error.unwrap_or_else(|| "Payment failed".to_string());
            payment.mark_failed(Some(&error));
            self.payments.store(payment.clone()).await?;
            warn!(payment_id = %payment.id(), error, "payment declined by gateway");
            return Ok(PaymentOutcome::Declined { error });
        }

        let transaction_id = response
            .transaction_id
            .unwrap_or_else(|| idempotency_key.clone());
        payment.mark_confirmed(&transaction_id)?;
        self.payments.store(payment.clone()).await?;

        contract.add_payment(payment.id());
        contract.mark_as_paid();

        // Auto-activation after payment: only when the coverage period has
        // started and the mandatory data types are approved.
        if contract.start_date() <= Utc::now().date_naive() {
            let verifications = self.verifications.get_by_client(contract.client_id()).await?;
            if policy::mandatory_data_verified(&verifications) {
                contract.activate()?;
            }
        }
        self.contracts.store(contract).await?;

        info!(payment_id = %payment.id(), transaction_id, "payment confirmed");
        Ok(PaymentOutcome::Confirmed {
            payment_id: payment.id(),
            transaction_id,
        })
    }
}
