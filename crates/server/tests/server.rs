mod common;

use chrono::NaiveDate;
use common::TestServer;
use core_types::{EmployeeFilter, EmployeeUpdate, NewEmployee, SalaryInput, Termination};
use protocol::{MAX_FRAME_LEN, Request, Response, Status, frame};
use rust_decimal_macros::dec;
use serde_json::json;
use server::connection::Connection;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;

fn ana(email: &str) -> NewEmployee {
    NewEmployee {
        first_name: "Ana".to_string(),
        middle_name: None,
        last_name: "Ruiz".to_string(),
        second_last_name: None,
        email: email.to_string(),
        phone: "555".to_string(),
        hire_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        department_id: 1,
        position_id: 1,
        salary: Some(SalaryInput::new(dec!(1000), dec!(200), dec!(50))),
    }
}

#[tokio::test]
async fn insert_then_select_round_trips_over_the_wire() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let inserted = client.insert(&ana("a@x.com")).await.unwrap();
    assert_eq!(inserted.status, Status::Success);
    let id = inserted.id.unwrap();

    let selected = client.select(&EmployeeFilter::by_id(id)).await.unwrap();
    let records = selected.data.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].email, "a@x.com");
    assert_eq!(records[0].salary_total, Some(dec!(1150)));
    assert_eq!(records[0].hire_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
}

#[tokio::test]
async fn select_of_unknown_id_is_an_empty_success() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let response = client.select(&EmployeeFilter::by_id(999)).await.unwrap();
    assert_eq!(response.status, Status::Success);
    assert_eq!(response.data, Some(vec![]));
}

#[tokio::test]
async fn garbage_gets_an_error_and_the_connection_stays_usable() {
    let server = TestServer::start().await;
    let mut connection = Connection::new(TcpStream::connect(server.addr).await.unwrap());

    connection.write_frame(b"this is not json").await.unwrap();
    let response: Response = connection.read_message().await.unwrap().unwrap();
    assert_eq!(response.status, Status::Error);
    assert!(response.message.unwrap().starts_with("malformed payload"));

    connection
        .write_frame(br#"{"operation": "SELECT", "data": {}}"#)
        .await
        .unwrap();
    let response: Response = connection.read_message().await.unwrap().unwrap();
    assert_eq!(response.status, Status::Success);
}

#[tokio::test]
async fn unknown_operation_is_rejected() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let request = Request { operation: "TRUNCATE".to_string(), data: json!({}) };
    let response = client.send(&request).await.unwrap();
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.message.as_deref(), Some("invalid operation"));
}

#[tokio::test]
async fn update_and_deactivate_flow() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let id = client.insert(&ana("b@x.com")).await.unwrap().id.unwrap();

    let update = EmployeeUpdate { id, phone: Some("777".to_string()), ..Default::default() };
    let response = client.update(&update).await.unwrap();
    assert_eq!(response.rows_affected, Some(1));

    let record = client.select(&EmployeeFilter::by_email("b@x.com")).await.unwrap().data.unwrap().remove(0);
    assert_eq!(record.phone, "777");
    assert_eq!(record.salary_total, Some(dec!(1150)));

    let response = client.delete(&Termination::new(id, None)).await.unwrap();
    assert_eq!(response.rows_affected, Some(1));

    let response = client.delete(&Termination::new(id, None)).await.unwrap();
    assert_eq!(response.status, Status::Error);
    assert_eq!(server.store.terminations(), vec![(id, "unspecified".to_string())]);
}

#[tokio::test]
async fn clients_are_served_concurrently() {
    let server = TestServer::start().await;

    // Held open and idle; must not block anyone else.
    let _idle = server.client().await;

    let mut tasks = Vec::new();
    for n in 0..8 {
        let addr = server.addr;
        tasks.push(tokio::spawn(async move {
            let mut client = server::Client::connect(addr).await.unwrap();
            client.insert(&ana(&format!("c{n}@x.com"))).await.unwrap()
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_success());
    }

    let mut client = server.client().await;
    let everyone = client.select(&EmployeeFilter::default()).await.unwrap().data.unwrap();
    assert_eq!(everyone.len(), 8);
}

#[tokio::test]
async fn a_client_vanishing_mid_frame_does_not_affect_others() {
    let server = TestServer::start().await;

    let mut broken = TcpStream::connect(server.addr).await.unwrap();
    let framed = frame::encode(br#"{"operation": "SELECT"}"#).unwrap();
    broken.write_all(&framed[..6]).await.unwrap();
    drop(broken);

    let mut client = server.client().await;
    let response = client.select(&EmployeeFilter::default()).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn an_oversized_result_is_answered_with_an_error_and_the_connection_survives() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let name = "x".repeat(1024 * 1024);
    let mut last_id = 0;
    for n in 0..9 {
        let mut employee = ana(&format!("big{n}@x.com"));
        employee.first_name = name.clone();
        last_id = client.insert(&employee).await.unwrap().id.unwrap();
    }

    let response = client.select(&EmployeeFilter::default()).await.unwrap();
    assert_eq!(response.status, Status::Error);
    let message = response.message.unwrap();
    assert!(message.starts_with("response too large"), "{message}");
    assert!(message.contains(&MAX_FRAME_LEN.to_string()));

    let response = client.select(&EmployeeFilter::by_id(last_id)).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.data.unwrap()[0].first_name.len(), name.len());
}

#[tokio::test]
async fn run_returns_cleanly_on_shutdown() {
    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let store = std::sync::Arc::new(common::MemoryStore::default());
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(server::run(listener, store, async move {
        let _ = rx.await;
    }));
    tx.send(()).unwrap();

    assert!(handle.await.unwrap().is_ok());
}
