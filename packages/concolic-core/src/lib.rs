/*
 * Concolic Core - trace-driven test generation engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (IrType, MethodRef, MethodInfo, Visibility)
 * - domain/      : Collaborator ports (program model, executor, solver, coverage, sink)
 * - features/    : Vertical slices (state → transformer → descriptor → concolic)
 * - config/      : Preset-based engine configuration
 *
 * Data flow:
 *   concrete run → trace → predicate state → mutation → solver → model
 *   → descriptors → concrete run
 */

#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::type_complexity)] // Memo tables keyed by handle pairs

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Engine configuration (presets, stage configs, YAML)
pub mod config;

/// Collaborator ports
pub mod domain;

/// Crate-wide error taxonomy
pub mod errors;

/// Feature modules (vertical slices)
pub mod features;

/// Shared models
pub mod shared;

pub use config::{EngineConfig, Preset, ValidatedConfig};
pub use errors::{ConcolicError, ErrorSeverity, Result};
pub use features::concolic::{ConcolicChecker, MethodReport, SearchOutcome};
