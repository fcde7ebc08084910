//! Unit tests for keel CLI
//!
//! These tests drive application services through hand-written port mocks
//! and run fast without external I/O.
