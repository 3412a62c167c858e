//! gRPC service implementation for to-do items.
//!
//! [`ToDoService`] implements the generated [`ToDoIt`] trait on top of any
//! [`Store`]. Each RPC is split in two layers:
//!
//! - an inherent method (`create`, `read`, ...) holding the validation and
//!   store logic and returning a [`todoit_core::Error`] on failure, and
//! - the trait method, which adds the span, logging and metrics and converts
//!   the error into a `tonic::Status`.
//!
//! Mutating RPCs run inside a single store transaction and return only after
//! it is persisted. If the client goes away mid-call, tonic drops the future,
//! the transaction is dropped with it and nothing is written.

use crate::server::{
    service::validate::{require_content, require_id, require_status},
    telemetry::{increment_request_errors, increment_requests, record_request_duration},
};
use std::sync::Arc;
use std::time::Instant;
use todoit_core::{
    Error,
    proto::{
        CreateToDoRequest, CreateToDoResponse, DeleteToDoRequest, DeleteToDoResponse,
        ListToDoRequest, ListToDoResponse, ReadToDoRequest, ReadToDoResponse, UpdateToDoRequest,
        UpdateToDoResponse, to_do_it_server::ToDoIt,
    },
    types::NewToDoItem,
};
use todoit_store::{Store, StoreTx};
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

/// The `ToDoIt` gRPC service.
///
/// Holds no per-request state: every call reads from or writes to the
/// injected store and nothing else.
pub struct ToDoService<S> {
    store: Arc<S>,
    strict_updates: bool,
}

impl<S> Clone for ToDoService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            strict_updates: self.strict_updates,
        }
    }
}

impl<S: Store> ToDoService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            strict_updates: false,
        }
    }

    /// Validates title and description on update the same way create does.
    pub fn with_strict_updates(mut self, strict: bool) -> Self {
        self.strict_updates = strict;
        self
    }

    /// Releases the store. Called once the server stops accepting calls.
    pub async fn shutdown(&self) {
        self.store.close().await;
    }

    pub async fn create(&self, req: CreateToDoRequest) -> Result<CreateToDoResponse, Error> {
        require_content(&req.title, &req.description)?;

        let mut tx = self.store.begin().await?;
        let item = tx
            .insert(NewToDoItem::new(req.title, req.description))
            .await?;
        tx.persist().await?;

        debug!(id = item.id, "Created todo item");
        Ok(CreateToDoResponse { id: item.id })
    }

    pub async fn read(&self, req: ReadToDoRequest) -> Result<ReadToDoResponse, Error> {
        let id = require_id(req.id)?;

        let item = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound { id })?;
        Ok(item.into())
    }

    pub async fn list(&self, _req: ListToDoRequest) -> Result<ListToDoResponse, Error> {
        let items = self.store.list_all().await?;
        debug!(count = items.len(), "Listed todo items");
        Ok(ListToDoResponse {
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn update(&self, req: UpdateToDoRequest) -> Result<UpdateToDoResponse, Error> {
        let id = require_id(req.id)?;
        let status = require_status(req.status)?;
        if self.strict_updates {
            require_content(&req.title, &req.description)?;
        }

        let mut tx = self.store.begin().await?;
        let mut item = tx.find_by_id(id).await?.ok_or(Error::NotFound { id })?;
        item.title = req.title;
        item.description = req.description;
        item.status = status;
        tx.update(&item).await?;
        tx.persist().await?;

        debug!(id, status = status.as_str_name(), "Updated todo item");
        Ok(UpdateToDoResponse { id: item.id })
    }

    pub async fn delete(&self, req: DeleteToDoRequest) -> Result<DeleteToDoResponse, Error> {
        let id = require_id(req.id)?;

        let mut tx = self.store.begin().await?;
        let item = tx.find_by_id(id).await?.ok_or(Error::NotFound { id })?;
        tx.remove(&item).await?;
        tx.persist().await?;

        debug!(id, "Deleted todo item");
        Ok(DeleteToDoResponse { id: item.id })
    }
}

/// Records the outcome of an RPC and converts it into a tonic response.
fn respond<T>(
    method: &'static str,
    start: Instant,
    result: Result<T, Error>,
) -> Result<Response<T>, Status> {
    record_request_duration(method, start.elapsed().as_secs_f64() * 1000.0);
    match result {
        Ok(resp) => Ok(Response::new(resp)),
        Err(err) => {
            let status = Status::from(err);
            increment_request_errors(method, status.code());
            warn!(method, code = ?status.code(), "{}", status.message());
            Err(status)
        }
    }
}

#[tonic::async_trait]
impl<S: Store> ToDoIt for ToDoService<S> {
    #[tracing::instrument(skip_all)]
    async fn create_to_do(
        &self,
        req: Request<CreateToDoRequest>,
    ) -> Result<Response<CreateToDoResponse>, Status> {
        let start = Instant::now();
        increment_requests("CreateToDo");
        respond("CreateToDo", start, self.create(req.into_inner()).await)
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn read_to_do(
        &self,
        req: Request<ReadToDoRequest>,
    ) -> Result<Response<ReadToDoResponse>, Status> {
        let start = Instant::now();
        increment_requests("ReadToDo");
        respond("ReadToDo", start, self.read(req.into_inner()).await)
    }

    #[tracing::instrument(skip_all)]
    async fn list_to_do(
        &self,
        req: Request<ListToDoRequest>,
    ) -> Result<Response<ListToDoResponse>, Status> {
        let start = Instant::now();
        increment_requests("ListToDo");
        respond("ListToDo", start, self.list(req.into_inner()).await)
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn update_to_do(
        &self,
        req: Request<UpdateToDoRequest>,
    ) -> Result<Response<UpdateToDoResponse>, Status> {
        let start = Instant::now();
        increment_requests("UpdateToDo");
        respond("UpdateToDo", start, self.update(req.into_inner()).await)
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn delete_to_do(
        &self,
        req: Request<DeleteToDoRequest>,
    ) -> Result<Response<DeleteToDoResponse>, Status> {
        let start = Instant::now();
        increment_requests("DeleteToDo");
        respond("DeleteToDo", start, self.delete(req.into_inner()).await)
    }
}
