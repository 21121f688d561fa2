//! Model backends for Ponder: the client trait, HTTP and mock implementations,
//! the hourly token budget, and the cognitive-tier-aware router.

pub mod budget;
pub mod client;
pub mod mock;
pub mod router;
pub mod types;

pub use budget::{BudgetConfig, BudgetStatus, TierBudgetStatus, TokenBudgetManager};
pub use client::{HttpModelClient, ModelClient};
pub use mock::{mock_clients, MockConfig, MockModelClient};
pub use router::{mock_router, model_tier_for, ModelRouter, RouterStatus, RoutingDecision};
pub use types::{EndpointConfig, InferenceRequest, InferenceResponse, ModelTier};
