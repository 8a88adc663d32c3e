use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use core_types::{EmployeeFilter, EmployeeRecord, EmployeeUpdate, Lookup, NewEmployee, Termination};
use database::{DbError, EmployeeStore};
use server::{Client, bind, run};
use tokio::sync::oneshot;

/// An `EmployeeStore` kept in memory, with the same observable rules as the
/// PostgreSQL repository: derived totals, sparse updates, one-way deactivation.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<EmployeeRecord>>,
    terminations: Mutex<Vec<(i64, String)>>,
}

impl MemoryStore {
    pub fn terminations(&self) -> Vec<(i64, String)> {
        self.terminations.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<i64, DbError> {
        let mut records = self.records.lock().unwrap();
        let id = records.len() as i64 + 1;
        let total = employee.salary.as_ref().map(|s| s.total()).transpose()?;
        let now = Utc::now();

        records.push(EmployeeRecord {
            id,
            first_name: employee.first_name.clone(),
            middle_name: employee.middle_name.clone(),
            last_name: employee.last_name.clone(),
            second_last_name: employee.second_last_name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            hire_date: employee.hire_date,
            department_id: Some(employee.department_id),
            position_id: Some(employee.position_id),
            active: true,
            created_at: now,
            updated_at: now,
            salary_base: employee.salary.map(|s| s.base),
            salary_bonus: employee.salary.map(|s| s.bonus),
            salary_deductions: employee.salary.map(|s| s.deductions),
            salary_total: total,
            department: None,
            position: None,
        });
        Ok(id)
    }

    async fn update_employee(&self, update: &EmployeeUpdate) -> Result<u64, DbError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == update.id)
            .ok_or(DbError::NotFound(update.id))?;

        let mut rows = 0;
        if update.has_field_changes() {
            if let Some(phone) = &update.phone {
                record.phone = phone.clone();
            }
            if let Some(email) = &update.email {
                record.email = email.clone();
            }
            if let Some(middle_name) = &update.middle_name {
                record.middle_name = middle_name.clone();
            }
            record.updated_at = Utc::now();
            rows += 1;
        }
        if let Some(salary) = &update.salary {
            record.salary_base = Some(salary.base);
            record.salary_bonus = Some(salary.bonus);
            record.salary_deductions = Some(salary.deductions);
            record.salary_total = Some(salary.total()?);
            rows += 1;
        }
        Ok(rows)
    }

    async fn select_employees(&self, filter: &EmployeeFilter) -> Result<Vec<EmployeeRecord>, DbError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| match filter.lookup() {
                Lookup::ById(id) => r.id == id,
                Lookup::ByEmail(email) => r.email == email,
                Lookup::All => true,
            })
            .cloned()
            .collect())
    }

    async fn deactivate_employee(&self, termination: &Termination) -> Result<u64, DbError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == termination.id && r.active)
            .ok_or(DbError::NotActive(termination.id))?;

        record.active = false;
        self.terminations
            .lock()
            .unwrap()
            .push((termination.id, termination.reason_or_default().to_string()));
        Ok(1)
    }
}

/// A server running on an ephemeral port. Dropping it stops the accept loop.
pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub store: Arc<MemoryStore>,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub async fn start() -> TestServer {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::new(MemoryStore::default());
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(run(listener, store.clone(), async move {
            let _ = rx.await;
        }));

        TestServer { addr, store, _shutdown: tx }
    }

    pub async fn client(&self) -> Client {
        Client::connect(self.addr).await.unwrap()
    }
}
