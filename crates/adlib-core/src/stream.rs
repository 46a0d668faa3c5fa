//! Page stream trait.

use futures_core::Stream;

use crate::Result;
use crate::page::Page;

/// Lazily fetched sequence of result pages, in server order.
///
/// The next request is only issued when the consumer polls for the next
/// page, so dropping the stream ends pagination.
pub trait PageStream<T>: Stream<Item = Result<Page<T>>> + Send {}

impl<T, S> PageStream<T> for S where S: Stream<Item = Result<Page<T>>> + Send {}
