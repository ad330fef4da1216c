//! Customer state slice.
//!
//! Tracks which customers the application knows about and the progress of
//! customer API requests. Customer records themselves live in the shared
//! entity cache; this slice only keeps their ids.
//!
//! - [`actions`]: pure action creators describing API calls
//! - [`CustomerReducer`]: folds the request/success/failure lifecycle into
//!   [`CustomerState`]
//! - [`selectors`]: read-only projections, denormalizing customers from the
//!   entity cache
//!
//! # Quick Start
//!
//! ```
//! use shopfront_core::api::{ApiResponse, HttpMethod};
//! use shopfront_core::entities::IdSelection;
//! use shopfront_core::Reducer;
//! use shopfront_customer::{CustomerAction, CustomerReducer, CustomerState, actions, selectors};
//!
//! let call = actions::load_customers();
//! assert_eq!(call.endpoint, "admin/customers");
//! assert_eq!(call.method, HttpMethod::Get);
//!
//! let reducer = CustomerReducer::new();
//! let mut state = CustomerState::new();
//!
//! let _ = reducer.reduce(&mut state, CustomerAction::LoadCustomersRequest, &());
//! assert!(selectors::loading(&state));
//!
//! let response = ApiResponse::new(IdSelection::many([1, 2]));
//! let _ = reducer.reduce(&mut state, CustomerAction::LoadCustomersSuccess { response }, &());
//! assert!(!selectors::loading(&state));
//! assert_eq!(state.ids.len(), 2);
//! ```

pub mod actions;
pub mod reducer;
pub mod selectors;
pub mod types;

// Re-export commonly used types
pub use reducer::CustomerReducer;
pub use types::{ActionDecodeError, Customer, CustomerAction, CustomerState};
