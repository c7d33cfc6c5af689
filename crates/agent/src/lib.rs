//! Ride orchestration - concurrent quote gathering and booking
//!
//! This crate is the working half of the cabby system. It turns a parsed
//! ride request into quotes and at most one booking:
//! - Extracts structured ride preferences from natural language
//!   (`extractor`), with an optional semantic-parser fallback (`semantic`)
//! - Drives one automation session per provider through a shared
//!   open/quote/book/close state machine (`provider`, `automation`)
//! - Fans quote requests out concurrently with a bounded deadline and
//!   ranks the survivors (`orchestrator`)
//!
//! # Key Types
//!
//! - `Orchestrator` - comparison rounds and the single booking action
//! - `ProviderSession` - the per-provider state machine
//! - `AppProfile` - per-app vocabulary and goal text (Uber/Ola/Rapido)
//! - `AutomationBackend` - pluggable trait for whatever drives the device
//!
//! # Failure Principle
//!
//! A provider failing, hanging, or lying never aborts the round. Failures
//! are collected and excluded; the round only fails when nobody produced
//! a usable quote.

pub mod automation;
pub mod extractor;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod semantic;
pub mod simulation;
