//! Unit tests for span-to-BIO tagging.

mod tagger_tests;
