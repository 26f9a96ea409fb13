//! reelgate: API gateway for the reelgate video platform.
//!
//! Terminates client HTTP requests, verifies bearer credentials against the
//! authentication backend, and fans requests out to the upload and video
//! catalog backends over gRPC, translating upstream failures into the
//! gateway's HTTP error vocabulary.

pub mod config;
pub mod context;
pub mod error;
pub mod grpc;
pub mod metrics;
pub mod response;
pub mod routes;
pub mod types;
pub mod validation;
