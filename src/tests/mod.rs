//! End-to-end view model scenarios.
