//! Property-based tests for interpolation and the tabular store
