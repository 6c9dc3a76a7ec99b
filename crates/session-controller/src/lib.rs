//! Session Controller Library
//!
//! This library provides the client-side core for a multi-party video
//! conferencing session with bounded concurrent screen sharing:
//!
//! - Signed, time-bound join credential generation
//! - Admission control over the shared set of screen-share slots
//! - The session lifecycle state machine that owns both
//! - Normalization of the external SDK's event surface into typed events
//!
//! # Architecture
//!
//! All mutable session state lives inside a single [`actors::SessionActor`]
//! task fed by an mpsc mailbox:
//!
//! ```text
//! SessionHandle (cloneable)
//!   └── SessionActor (one per session)
//!       ├── owns the lifecycle state machine
//!       ├── owns the AdmissionController (participants + share slots)
//!       ├── owns the SdkCapability implementation (platform bridge)
//!       └── notifies the RendererBinding of slot changes
//! ```
//!
//! The actor processes one command or adapter event at a time, in arrival
//! order. That single dispatch loop is what upholds the no-overlap guarantee
//! the admission decisions depend on: capacity is always observed at the
//! instant of the request, and no decision point ever suspends.
//!
//! # Key Design Decisions
//!
//! - **One owner for the slot set**: only the admission controller mutates
//!   participants and slots; everything else sees notifications.
//! - **Local and remote requests share one rule**: the local user's
//!   share-start takes the identical admission path as a remote
//!   participant's, with no privileged bypass.
//! - **Client-side cap with a defensive double-check**: remote share-starts
//!   are re-admitted locally even though the platform is expected to enforce
//!   the same limit.
//!
//! # Modules
//!
//! - [`actors`] - session actor and its message types
//! - [`admission`] - share-slot admission controller
//! - [`config`] - environment configuration, fail-fast on missing secrets
//! - [`credential`] - join credential generator
//! - [`errors`] - error taxonomy
//! - [`recording`] - cloud recording sub-state machine
//! - [`renderer`] - renderer binding interface
//! - [`sdk`] - external SDK capability surface and event normalization

pub mod actors;
pub mod admission;
pub mod config;
pub mod credential;
pub mod errors;
pub mod recording;
pub mod renderer;
pub mod sdk;
