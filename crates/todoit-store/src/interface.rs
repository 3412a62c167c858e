use core::future::Future;
use todoit_core::{
    StoreError,
    types::{NewToDoItem, ToDoId, ToDoItem},
};

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Durable storage for to-do items.
///
/// Reads that need no consistency with a following write go straight to the
/// store. Anything that mutates goes through a transaction obtained from
/// [`Store::begin`] so that the lookup and the write it depends on happen
/// against the same snapshot and are committed together.
///
/// Implementations are cheap to share: the service keeps one behind an
/// `Arc` and calls it from every request task.
pub trait Store: Send + Sync + 'static {
    /// Unit of work returned by [`Store::begin`].
    type Tx: StoreTx;

    /// Starts a new transaction.
    fn begin(&self) -> impl Future<Output = StoreResult<Self::Tx>> + Send;

    /// Fetches a single item, `None` when no item has this id.
    fn find_by_id(&self, id: ToDoId) -> impl Future<Output = StoreResult<Option<ToDoItem>>> + Send;

    /// Fetches every item. Order is implementation defined.
    fn list_all(&self) -> impl Future<Output = StoreResult<Vec<ToDoItem>>> + Send;

    /// Releases backend resources. Called once on shutdown.
    fn close(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// A pending set of writes against a [`Store`].
///
/// Nothing staged here is visible to other callers until
/// [`persist`](StoreTx::persist) succeeds. Dropping the transaction rolls it
/// back.
pub trait StoreTx: Send {
    /// Fetches a single item as seen by this transaction, including its own
    /// staged writes.
    fn find_by_id(
        &mut self,
        id: ToDoId,
    ) -> impl Future<Output = StoreResult<Option<ToDoItem>>> + Send;

    /// Stages a new item and returns it with its assigned id. Ids are never
    /// handed out twice, even if this transaction is rolled back.
    fn insert(&mut self, item: NewToDoItem) -> impl Future<Output = StoreResult<ToDoItem>> + Send;

    /// Stages a whole-record overwrite of an existing item.
    fn update(&mut self, item: &ToDoItem) -> impl Future<Output = StoreResult<()>> + Send;

    /// Stages the permanent removal of an existing item.
    fn remove(&mut self, item: &ToDoItem) -> impl Future<Output = StoreResult<()>> + Send;

    /// Durably commits every staged write.
    fn persist(self) -> impl Future<Output = StoreResult<()>> + Send;
}
