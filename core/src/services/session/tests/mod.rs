//! Unit tests for the session service
