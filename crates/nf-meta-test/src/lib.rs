//! End-to-end tests for the nf-meta crate.
