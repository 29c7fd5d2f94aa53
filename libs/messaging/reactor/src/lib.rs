//! # Reactor Fabric Endpoints
//!
//! A [`ReactorNode`] connects to the router under a numeric [`ReactorId`] and
//! runs a receive task that feeds a [`ReactorHandler`]:
//!
//! - single-frame units go to `on_message`
//! - failure notices go to `on_delivery_failure` as a [`DeliveryFailure`]
//! - anything that fails to decode is logged and skipped
//!
//! What to do about a failed delivery is up to the handler. [`RetryPolicy`]
//! covers the common case of a bounded number of resends.
//!
//! ```rust,no_run
//! use fabric_config::{ReactorConfig, TransportSettings};
//! use reactor::{handler_fn, ReactorId, ReactorNode, RetryPolicy};
//!
//! # async fn demo() -> reactor::Result<()> {
//! let policy = RetryPolicy::default();
//! let node = ReactorNode::connect(
//!     ReactorId::new(10),
//!     &ReactorConfig::default(),
//!     &TransportSettings::default(),
//!     handler_fn(
//!         |_, payload| println!("received {:?}", payload),
//!         move |ctx, failure| {
//!             let _ = policy.apply(ctx, &failure);
//!         },
//!     ),
//! )
//! .await;
//! node.send(ReactorId::new(7), "Hello World!")?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handler;
pub mod metrics;
pub mod node;
pub mod retry;

pub use codec::ReactorId;
pub use error::{ReactorError, Result};
pub use handler::{handler_fn, DeliveryFailure, FnHandler, ReactorContext, ReactorHandler};
pub use metrics::{ReactorMetrics, ReactorMetricsSnapshot};
pub use node::ReactorNode;
pub use retry::{RetryDecision, RetryPolicy};
