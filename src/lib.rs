//! Runtime string localization for the package repository server.
//!
//! Exposes the [`i18n`] module, which turns message keys into strings in the
//! server's active language, and the environment [`config`] it is built from.

pub mod config;
pub mod i18n;
