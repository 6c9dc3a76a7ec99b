//! # Session Controller Test Utilities
//!
//! Shared test utilities for the floor-control session controller.
//!
//! This crate provides mock implementations and fixtures for isolated
//! controller testing without a real conferencing platform:
//!
//! - [`mock_sdk`] - scripted `SdkCapability` implementation with a recorded
//!   call log and an external event driver
//! - [`mock_renderer`] - renderer binding that records every notification
//! - [`fixtures`] - pre-configured environment/config fixtures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sc_test_utils::{fixtures, MockSdk, RecordingRenderer};
//! use session_controller::actors::SessionActor;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let (sdk, driver) = MockSdk::builder().build();
//!     let (renderer, log) = RecordingRenderer::new();
//!     let (handle, _task) =
//!         SessionActor::spawn(fixtures::test_config(), sdk, Box::new(renderer));
//!
//!     handle.start().await.unwrap();
//!     driver.user_added(101, "alice");
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_renderer;
pub mod mock_sdk;

pub use mock_renderer::{RecordingRenderer, RendererCall, RendererLog};
pub use mock_sdk::{MockSdk, MockSdkBuilder, MockSdkDriver, SdkCall};
