//! Unit tests for label config parsing.
//!
//! These tests exercise whole configs end to end: classification of input and
//! output tags, label ownership, conditional rules and diagnostics.
