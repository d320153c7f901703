//! Command orchestrators for business logic
//!
//! This module provides orchestrators that coordinate between the CLI layer
//! and the core workflow services.

pub mod storage_orchestrator;
pub mod tabular_orchestrator;
pub mod transfer_orchestrator;
