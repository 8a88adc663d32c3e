//! Routes a decoded request to the matching store operation.

use std::panic::AssertUnwindSafe;

use core_types::{EmployeeFilter, EmployeeUpdate, NewEmployee, Termination};
use database::EmployeeStore;
use futures::FutureExt;
use protocol::{Operation, Request, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::ServerError;

/// Executes one request and always produces a response.
///
/// Unknown operation tags are answered without touching the store. Errors,
/// and panics escaping the store, become error responses.
pub async fn dispatch(store: &dyn EmployeeStore, request: Request) -> Response {
    let operation = request.operation.clone();

    match AssertUnwindSafe(execute(store, request)).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            tracing::warn!(%operation, error = %err, "Operation failed.");
            Response::from(&err)
        }
        Err(_) => {
            tracing::error!(%operation, "Operation panicked.");
            Response::from(&ServerError::Panicked)
        }
    }
}

async fn execute(store: &dyn EmployeeStore, request: Request) -> Result<Response, ServerError> {
    let Some(operation) = request.operation() else {
        return Err(ServerError::InvalidOperation(request.operation));
    };

    match operation {
        Operation::Insert => {
            let employee: NewEmployee = payload(request.data)?;
            employee
                .validate()
                .map_err(|e| ServerError::InvalidPayload(e.to_string()))?;
            let id = store.insert_employee(&employee).await?;
            Ok(Response::inserted(id))
        }
        Operation::Update => {
            let update: EmployeeUpdate = payload(request.data)?;
            update
                .validate()
                .map_err(|e| ServerError::InvalidPayload(e.to_string()))?;
            let rows_affected = store.update_employee(&update).await?;
            Ok(Response::updated(rows_affected))
        }
        Operation::Select => {
            let filter: EmployeeFilter = payload(request.data)?;
            let records = store.select_employees(&filter).await?;
            Ok(Response::records(records))
        }
        Operation::Delete => {
            let termination: Termination = payload(request.data)?;
            let rows_affected = store.deactivate_employee(&termination).await?;
            Ok(Response::deactivated(rows_affected))
        }
    }
}

fn payload<T: DeserializeOwned>(data: JsonValue) -> Result<T, ServerError> {
    serde_json::from_value(data).map_err(|e| ServerError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::EmployeeRecord;
    use database::DbError;
    use protocol::Status;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records which operations reached it and answers with canned values.
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<&'static str>>,
        panic_on_select: bool,
    }

    impl RecordingStore {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl EmployeeStore for RecordingStore {
        async fn insert_employee(&self, _employee: &NewEmployee) -> Result<i64, DbError> {
            self.record("insert");
            Ok(17)
        }

        async fn update_employee(&self, update: &EmployeeUpdate) -> Result<u64, DbError> {
            self.record("update");
            if update.id == 404 {
                return Err(DbError::NotFound(update.id));
            }
            Ok(2)
        }

        async fn select_employees(&self, _filter: &EmployeeFilter) -> Result<Vec<EmployeeRecord>, DbError> {
            self.record("select");
            if self.panic_on_select {
                panic!("store blew up");
            }
            Ok(Vec::new())
        }

        async fn deactivate_employee(&self, termination: &Termination) -> Result<u64, DbError> {
            self.record("delete");
            Err(DbError::NotActive(termination.id))
        }
    }

    fn request(operation: &str, data: JsonValue) -> Request {
        Request { operation: operation.to_string(), data }
    }

    fn ana() -> JsonValue {
        json!({
            "primer_nombre": "Ana",
            "primer_apellido": "Ruiz",
            "email": "a@x.com",
            "celular": "555",
            "fecha_contratacion": "2024-01-10",
            "departamento_id": 1,
            "cargo_id": 1,
            "salario": {"salario_base": 1000, "bonificaciones": 200, "deducciones": 50}
        })
    }

    #[tokio::test]
    async fn unknown_operation_never_reaches_the_store() {
        let store = RecordingStore::default();

        for tag in ["DROP", "select", ""] {
            let response = dispatch(&store, request(tag, json!({}))).await;
            assert_eq!(response.status, Status::Error);
            assert_eq!(response.message.as_deref(), Some("invalid operation"));
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn insert_answers_with_the_generated_id() {
        let store = RecordingStore::default();

        let response = dispatch(&store, request("INSERT", ana())).await;
        assert!(response.is_success());
        assert_eq!(response.id, Some(17));
        assert_eq!(store.calls(), vec!["insert"]);
    }

    #[tokio::test]
    async fn badly_shaped_payload_is_rejected_before_the_store() {
        let store = RecordingStore::default();

        let response = dispatch(&store, request("INSERT", json!({"primer_nombre": "Ana"}))).await;
        assert_eq!(response.status, Status::Error);
        assert!(response.message.unwrap().starts_with("invalid payload: "));

        let mut blank = ana();
        blank["email"] = json!(" ");
        let response = dispatch(&store, request("INSERT", blank)).await;
        assert!(response.message.unwrap().starts_with("invalid payload: "));

        let response = dispatch(&store, request("UPDATE", json!({"id": 1, "estado": false}))).await;
        assert!(response.message.unwrap().starts_with("invalid payload: "));

        let response = dispatch(&store, request("UPDATE", json!({"id": 1, "primer_nombre": ""}))).await;
        assert_eq!(
            response.message.as_deref(),
            Some("invalid payload: Invalid input for primer_nombre: must not be empty")
        );

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn update_reports_rows_and_missing_employees() {
        let store = RecordingStore::default();

        let response = dispatch(&store, request("UPDATE", json!({"id": 3, "celular": "777"}))).await;
        assert_eq!(response.rows_affected, Some(2));

        let response = dispatch(&store, request("UPDATE", json!({"id": 404, "celular": "777"}))).await;
        assert_eq!(response.status, Status::Error);
        assert_eq!(response.message.as_deref(), Some("employee 404 not found"));
    }

    #[tokio::test]
    async fn select_without_data_lists_everyone() {
        let store = RecordingStore::default();

        let response = dispatch(&store, request("SELECT", json!({}))).await;
        assert!(response.is_success());
        assert_eq!(response.data, Some(Vec::new()));
    }

    #[tokio::test]
    async fn store_errors_are_reported_verbatim() {
        let store = RecordingStore::default();

        let response = dispatch(&store, request("DELETE", json!({"id": 5}))).await;
        assert_eq!(response.status, Status::Error);
        assert_eq!(response.message.as_deref(), Some("employee 5 not found or already inactive"));
    }

    #[tokio::test]
    async fn a_panicking_store_still_yields_a_response() {
        let store = RecordingStore { panic_on_select: true, ..Default::default() };

        let response = dispatch(&store, request("SELECT", json!({"id": 1}))).await;
        assert_eq!(response.status, Status::Error);
        assert_eq!(
            response.message.as_deref(),
            Some("internal error while handling the operation")
        );
    }
}
