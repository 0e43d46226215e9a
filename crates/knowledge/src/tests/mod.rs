//! Cross-module pipeline tests.

pub(crate) mod support;
