//! Workflow scenario tests against a scripted service.
