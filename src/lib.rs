//! Day-to-day monitoring administration for CloudWatch and Zabbix.
//!
//! [`cloudwatch::Session`] wraps alarms, dashboards, SNS topics and metric
//! filters for one AWS region. [`zabbix::Session`] wraps hosts, templates,
//! triggers, items and maintenance profiles over the Zabbix JSON-RPC API.

pub mod aws;
pub mod cloudwatch;
pub mod config;
pub mod core;
pub mod error;
pub mod helpers;
pub mod prompt;
pub mod termination;
pub mod zabbix;

pub use error::{FomoError, Result};
