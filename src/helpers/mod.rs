//! Free functions over the records the sessions return.

pub mod filter;
pub mod print;
pub mod snapshot;

pub use filter::{
    alarm_names, filter_composite_alarms, filter_metric_alarms, filter_metric_filters, filter_sns,
    metric_filter_names, replace_object_string, sort_alarms,
};
pub use print::{
    print_alarms_for_csv, print_composite_alarms, print_log_groups, print_metric_alarms,
    print_metric_filters, print_table,
};
pub use snapshot::{backup_alarms, load_alarms, load_dashboards, load_metric_filters};
