use complaint_desk::accounts::{Account, AccountRepository};
use complaint_desk::complaints::{
    sort_newest_first, Complaint, ComplaintFilter, ComplaintKey, ComplaintRepository,
    RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Complaint store keyed by internal id; `complaintId` is kept unique on insert.
#[derive(Default, Clone)]
pub(crate) struct InMemoryComplaintRepository {
    records: Arc<Mutex<HashMap<Uuid, Complaint>>>,
}

impl ComplaintRepository for InMemoryComplaintRepository {
    fn insert(&self, record: Complaint) -> Result<Complaint, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict(format!(
                "complaint {} already stored",
                record.id
            )));
        }
        if guard
            .values()
            .any(|existing| existing.complaint_id == record.complaint_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "complaint id {} already in use",
                record.complaint_id
            )));
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut complaints: Vec<Complaint> = guard
            .values()
            .filter(|complaint| filter.matches(complaint))
            .cloned()
            .collect();
        sort_newest_first(&mut complaints);
        Ok(complaints)
    }

    fn fetch(&self, key: &ComplaintKey) -> Result<Option<Complaint>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let found = match key {
            ComplaintKey::Id(id) => guard.get(id).cloned(),
            ComplaintKey::ComplaintId(_) => {
                guard.values().find(|complaint| key.matches(complaint)).cloned()
            }
        };
        Ok(found)
    }

    fn update(&self, record: Complaint) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

/// Accounts keyed by email as submitted.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountRepository {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
}

impl AccountRepository for InMemoryAccountRepository {
    fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        Ok(guard.get(email).cloned())
    }

    fn insert(&self, account: Account) -> Result<Account, RepositoryError> {
        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        if guard.contains_key(&account.email) {
            return Err(RepositoryError::Conflict(format!(
                "account {} already registered",
                account.email
            )));
        }
        guard.insert(account.email.clone(), account.clone());
        Ok(account)
    }
}
