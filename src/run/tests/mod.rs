//! Unit tests for the run bounded context.
