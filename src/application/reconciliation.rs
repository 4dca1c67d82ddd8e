use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::party::Client;
use crate::domain::policy;
use crate::domain::ports::{
    ClientStoreRef, ContractStoreRef, NotificationSenderRef, VerificationStoreRef,
};
use crate::error::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Knobs for the scan policies.
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationConfig {
    /// A contract unpaid for longer than this is flagged.
    pub unpaid_threshold_days: i64,
    /// Contracts ending within this many days get a renewal reminder.
    pub renewal_window_days: i64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            unpaid_threshold_days: 7,
            renewal_window_days: 30,
        }
    }
}

/// Per-pass counts from one reconciliation run. Passes count independently;
/// a contract broken in several ways can appear in more than one count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub overdue: usize,
    pub unpaid: usize,
    pub renewal_due: usize,
    pub expired: usize,
    pub data_integrity: usize,
}

impl ReconciliationReport {
    pub fn total(&self) -> usize {
        self.overdue + self.unpaid + self.renewal_due + self.expired + self.data_integrity
    }
}

/// Scans the whole contract population under five independent rule sets and
/// applies the resulting transitions and notifications. Designed to run as a
/// single periodic worker; each run is idempotent with respect to the
/// problem flag.
pub struct ContractReconciler {
    contracts: ContractStoreRef,
    verifications: VerificationStoreRef,
    clients: ClientStoreRef,
    notifications: NotificationSenderRef,
    config: ReconciliationConfig,
}

impl ContractReconciler {
    pub fn new(
        contracts: ContractStoreRef,
        verifications: VerificationStoreRef,
        clients: ClientStoreRef,
        notifications: NotificationSenderRef,
        config: ReconciliationConfig,
    ) -> Self {
        Self {
            contracts,
            verifications,
            clients,
            notifications,
            config,
        }
    }

    /// Runs the five passes in fixed order. A failure inside one contract is
    /// logged and skipped; only a failure to fetch a pass's population
    /// aborts the run.
    pub async fn run(&self) -> Result<ReconciliationReport> {
        info!("starting problematic contracts check");

        let report = ReconciliationReport {
            overdue: self.process_overdue().await?,
            unpaid: self.process_unpaid().await?,
            renewal_due: self.process_requiring_renewal().await?,
            expired: self.process_expired().await?,
            data_integrity: self.process_data_integrity().await?,
        };

        info!(
            total = report.total(),
            overdue = report.overdue,
            unpaid = report.unpaid,
            renewal_due = report.renewal_due,
            expired = report.expired,
            data_integrity = report.data_integrity,
            "problematic contracts check completed"
        );
        Ok(report)
    }

    pub async fn process_overdue(&self) -> Result<usize> {
        let today = Utc::now().date_naive();
        let mut count = 0;

        for contract in self.contracts.overdue(today).await? {
            match self.process_one_overdue(contract).await {
                Ok(()) => count += 1,
                Err(err) => error!(%err, "error processing overdue contract"),
            }
        }
        Ok(count)
    }

    async fn process_one_overdue(&self, mut contract: Contract) -> Result<()> {
        if contract.status() != ContractStatus::Overdue {
            contract.mark_overdue();
            self.contracts.store(contract.clone()).await?;
        }
        if !contract.is_flagged_problem() {
            contract.mark_problematic("Contract is overdue");
            self.contracts.store(contract.clone()).await?;
        }

        if let Some(client) = self.client_with_email(&contract).await? {
            let (subject, body) = overdue_notification(&contract, &client);
            self.notifications.send(&client.email, &subject, &body).await?;
        }

        warn!(
            contract_id = %contract.id(),
            number = contract.number().unwrap_or("N/A"),
            "found overdue contract"
        );
        Ok(())
    }

    pub async fn process_unpaid(&self) -> Result<usize> {
        let threshold_days = self.config.unpaid_threshold_days;
        let mut count = 0;

        for contract in self.contracts.unpaid(threshold_days, Utc::now()).await? {
            match self.process_one_unpaid(contract, threshold_days).await {
                Ok(()) => count += 1,
                Err(err) => error!(%err, "error processing unpaid contract"),
            }
        }
        Ok(count)
    }

    async fn process_one_unpaid(&self, mut contract: Contract, threshold_days: i64) -> Result<()> {
        if !contract.is_flagged_problem() {
            contract.mark_problematic(&format!(
                "Contract unpaid for more than {} days",
                threshold_days
            ));
            self.contracts.store(contract.clone()).await?;
        }

        if let Some(client) = self.client_with_email(&contract).await? {
            let (subject, body) = unpaid_notification(&contract, &client, threshold_days);
            self.notifications.send(&client.email, &subject, &body).await?;
        }

        warn!(
            contract_id = %contract.id(),
            number = contract.number().unwrap_or("N/A"),
            "found unpaid contract"
        );
        Ok(())
    }

    /// Reminder only: never flags problems, never persists a status change.
    pub async fn process_requiring_renewal(&self) -> Result<usize> {
        let today = Utc::now().date_naive();
        let window_days = self.config.renewal_window_days;
        let mut count = 0;

        for contract in self.contracts.requiring_renewal(today, window_days).await? {
            match self.remind_renewal(&contract, window_days).await {
                Ok(()) => count += 1,
                Err(err) => error!(%err, "error processing contract requiring renewal"),
            }
        }
        Ok(count)
    }

    async fn remind_renewal(&self, contract: &Contract, window_days: i64) -> Result<()> {
        if let Some(client) = self.client_with_email(contract).await? {
            let (subject, body) = renewal_reminder(contract, &client, window_days);
            self.notifications.send(&client.email, &subject, &body).await?;
        }
        info!(
            contract_id = %contract.id(),
            end_date = %contract.end_date(),
            "contract requires renewal"
        );
        Ok(())
    }

    pub async fn process_expired(&self) -> Result<usize> {
        let today = Utc::now().date_naive();
        let mut count = 0;

        for contract in self.contracts.expired(today).await? {
            match self.process_one_expired(contract).await {
                Ok(()) => count += 1,
                Err(err) => error!(%err, "error processing expired contract"),
            }
        }
        Ok(count)
    }

    async fn process_one_expired(&self, mut contract: Contract) -> Result<()> {
        if contract.status() != ContractStatus::Expired {
            contract.expire();
            self.contracts.store(contract.clone()).await?;
        }

        if let Some(client) = self.client_with_email(&contract).await? {
            let (subject, body) = expired_notification(&contract, &client);
            self.notifications.send(&client.email, &subject, &body).await?;
        }

        info!(
            contract_id = %contract.id(),
            number = contract.number().unwrap_or("N/A"),
            "marked contract as expired"
        );
        Ok(())
    }

    /// Walks every contract and collects data-integrity and verification
    /// problems into one reason per contract.
    pub async fn process_data_integrity(&self) -> Result<usize> {
        let mut count = 0;

        for contract in self.contracts.get_all().await? {
            let problems = match self.collect_problems(&contract).await {
                Ok(problems) => problems,
                Err(err) => {
                    error!(%err, contract_id = %contract.id(), "error checking contract integrity");
                    continue;
                }
            };
            if problems.is_empty() {
                continue;
            }

            let reason = problems.join("; ");
            if !contract.is_flagged_problem() {
                let mut contract = contract.clone();
                contract.mark_problematic(&reason);
                if let Err(err) = self.contracts.store(contract).await {
                    error!(%err, "error marking contract as problematic");
                    continue;
                }
            }
            count += 1;
            warn!(
                contract_id = %contract.id(),
                number = contract.number().unwrap_or("N/A"),
                reason,
                "data/verification issue in contract"
            );
        }
        Ok(count)
    }

    async fn collect_problems(&self, contract: &Contract) -> Result<Vec<String>> {
        let mut problems = Vec::new();

        if contract.number().map_or(true, |n| n.trim().is_empty()) {
            problems.push("Missing contract number".to_string());
        }
        if contract.client_id().is_nil() {
            problems.push("Missing client".to_string());
        }
        if contract.service_id().is_nil() {
            problems.push("Missing insurance service".to_string());
        }
        if contract.premium().amount() <= Decimal::ZERO {
            problems.push("Premium amount must be positive".to_string());
        }
        if contract.end_date() < contract.start_date() {
            problems.push("EndDate earlier than StartDate".to_string());
        }

        let verifications = self.verifications.get_by_client(contract.client_id()).await?;
        let pending = policy::pending_required(&verifications);
        if !pending.is_empty() {
            problems.push(format!("Pending verification for: {}", pending.join(", ")));
        }
        let missing = policy::missing_required(&verifications);
        if !missing.is_empty() {
            problems.push(format!("No approved verification for: {}", missing.join(", ")));
        }

        Ok(problems)
    }

    async fn client_with_email(&self, contract: &Contract) -> Result<Option<Client>> {
        let client = self.clients.get(contract.client_id()).await?;
        Ok(client.filter(|c| !c.email.is_empty()))
    }
}

fn contract_label(contract: &Contract) -> String {
    contract
        .number()
        .map(str::to_string)
        .unwrap_or_else(|| contract.id().to_string())
}

fn overdue_notification(contract: &Contract, client: &Client) -> (String, String) {
    let label = contract_label(contract);
    let subject = format!("Договор {} просрочен", label);
    let body = format!(
        "Уважаемый(ая) {}!\n\n\
         Ваш договор страхования {} просрочен.\n\
         Дата окончания: {}\n\n\
         Пожалуйста, свяжитесь с нами для решения вопроса о продлении договора.\n\n\
         С уважением,\nСтраховое агентство",
        client.full_name,
        label,
        contract.end_date().format("%d.%m.%Y")
    );
    (subject, body)
}

fn unpaid_notification(
    contract: &Contract,
    client: &Client,
    threshold_days: i64,
) -> (String, String) {
    let label = contract_label(contract);
    let subject = format!("Требуется оплата договора {}", label);
    let body = format!(
        "Уважаемый(ая) {}!\n\n\
         Ваш договор страхования {} не оплачен более {} дней.\n\
         Сумма к оплате: {}\n\n\
         Пожалуйста, произведите оплату в ближайшее время.\n\n\
         С уважением,\nСтраховое агентство",
        client.full_name, label, threshold_days, contract.premium()
    );
    (subject, body)
}

fn renewal_reminder(contract: &Contract, client: &Client, window_days: i64) -> (String, String) {
    let label = contract_label(contract);
    let subject = format!(
        "Напоминание: договор {} заканчивается через {} дней",
        label, window_days
    );
    let body = format!(
        "Уважаемый(ая) {}!\n\n\
         Напоминаем, что ваш договор страхования {} заканчивается {}.\n\n\
         Для продления договора, пожалуйста, свяжитесь с нашим агентством.\n\n\
         С уважением,\nСтраховое агентство",
        client.full_name,
        label,
        contract.end_date().format("%d.%m.%Y")
    );
    (subject, body)
}

fn expired_notification(contract: &Contract, client: &Client) -> (String, String) {
    let label = contract_label(contract);
    let subject = format!("Договор {} истек", label);
    let body = format!(
        "Уважаемый(ая) {}!\n\n\
         Ваш договор страхования {} истек {}.\n\n\
         Если вы хотите продлить договор, пожалуйста, свяжитесь с нашим агентством.\n\n\
         С уважением,\nСтраховое агентство",
        client.full_name,
        label,
        contract.end_date().format("%d.%m.%Y")
    );
    (subject, body)
}
