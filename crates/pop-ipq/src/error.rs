//! Error type for [`crate::IndexedPriorityQueue`].

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IpqError {
    #[error("item is already present in the queue")]
    DuplicateItem,

    #[error("item not found in the queue")]
    ItemNotFound,

    #[error("queue is empty")]
    Empty,
}

pub type IpqResult<T> = Result<T, IpqError>;
