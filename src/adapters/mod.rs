//! Contracts for the platform capabilities the views use beside the store.
//!
//! Each adapter wraps one capability behind a trait so the view layer can be
//! handed a real browser binding or a fake. Platform failures are translated
//! into each adapter's outcome types here and never reach the store.

pub mod camera;
pub mod connectivity;
pub mod notify;
pub mod share;

use std::future::Future;
use std::pin::Pin;

/// Boxed future used where a capability must be stored as a trait object.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
