use core_types::{EmployeeFilter, EmployeeUpdate, NewEmployee, Termination};
use protocol::{Operation, Request, Response};
use serde::Serialize;
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::ServerError;
use crate::connection::Connection;

/// Async client for the records server. One request in flight at a time.
pub struct Client {
    connection: Connection,
}

impl Client {
    pub async fn connect<T: ToSocketAddrs>(addr: T) -> Result<Client, ServerError> {
        let socket = TcpStream::connect(addr).await?;
        let connection = Connection::new(socket);

        Ok(Client { connection })
    }

    /// Sends a request and waits for its response.
    pub async fn send(&mut self, request: &Request) -> Result<Response, ServerError> {
        self.connection.write_message(request).await?;
        self.read_response().await
    }

    pub async fn insert(&mut self, employee: &NewEmployee) -> Result<Response, ServerError> {
        self.call(Operation::Insert, employee).await
    }

    pub async fn update(&mut self, update: &EmployeeUpdate) -> Result<Response, ServerError> {
        self.call(Operation::Update, update).await
    }

    pub async fn select(&mut self, filter: &EmployeeFilter) -> Result<Response, ServerError> {
        self.call(Operation::Select, filter).await
    }

    pub async fn delete(&mut self, termination: &Termination) -> Result<Response, ServerError> {
        self.call(Operation::Delete, termination).await
    }

    async fn call(&mut self, operation: Operation, data: &impl Serialize) -> Result<Response, ServerError> {
        let request = Request::new(operation, data)?;
        self.send(&request).await
    }

    async fn read_response(&mut self) -> Result<Response, ServerError> {
        match self.connection.read_message().await? {
            Some(response) => Ok(response),
            None => Err(ServerError::ConnectionReset),
        }
    }
}
