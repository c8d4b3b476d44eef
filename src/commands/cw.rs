//! `fomo cw ...` commands.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use fomo::core::{
    ActionType, Alarm, AlarmField, AlarmSearchBy, AlarmSet, Dashboard, FilterSearchBy, MatchMode,
    MetricFilter, ModifyAction, SubscriptionProtocol, TreatMissingData,
};
use fomo::helpers::{self, snapshot};
use fomo::prompt::Console;
use fomo::termination;

use super::Globals;

#[derive(Subcommand)]
pub enum CwCommand {
    /// Metric and composite alarms
    Alarm {
        #[command(subcommand)]
        command: AlarmCommand,
    },
    /// Dashboards
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommand,
    },
    /// SNS topics and subscriptions
    Sns {
        #[command(subcommand)]
        command: SnsCommand,
    },
    /// Log groups and metric filters
    Logs {
        #[command(subcommand)]
        command: LogsCommand,
    },
}

#[derive(Subcommand)]
pub enum AlarmCommand {
    /// Show one alarm
    Get { name: String },
    /// List alarms, optionally filtered
    List {
        /// Substring to look for
        #[arg(short, long)]
        search: Option<String>,
        /// Keep matches (match) or drop them (invert)
        #[arg(long, default_value = "match")]
        mode: MatchMode,
        /// Which part of the alarm to search: all, name or metrics
        #[arg(long, default_value = "all")]
        search_by: AlarmSearchBy,
        /// Print only this field: all, AlarmName, StateValue, ActionsEnabled, TreatMissingData
        #[arg(long, default_value = "all")]
        field: AlarmField,
        /// Group alarms sharing a name suffix
        #[arg(long)]
        sort: bool,
        /// `name;[topics]` rows
        #[arg(long)]
        csv: bool,
    },
    /// Create an alarm from a JSON file holding one alarm
    Put {
        file: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    /// Rename an alarm
    Rename {
        old_name: String,
        new_name: String,
        /// Leave the old alarm in place
        #[arg(long)]
        keep_old: bool,
    },
    /// Copy an alarm under a new name
    Copy { name: String, new_name: String },
    /// Rename alarms from two pasted lists, disabling each one first
    RenameList,
    /// Delete an alarm
    Delete {
        name: String,
        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
    /// Enable alarm actions
    Enable { name: String },
    /// Disable alarm actions
    Disable { name: String },
    /// Replace text anywhere in an alarm
    Replace {
        name: String,
        search: String,
        replace: String,
        /// Write the result back instead of only printing it
        #[arg(long)]
        apply: bool,
    },
    /// Add or remove an SNS topic on one of the action lists
    Action {
        name: String,
        action: ModifyAction,
        /// OKActions, AlarmActions or InsufficientDataActions
        action_type: ActionType,
        sns: String,
    },
    /// Set TreatMissingData on a metric alarm
    TreatMissing {
        name: String,
        /// missing, breaching, notBreaching or ignore
        value: TreatMissingData,
    },
    /// Set the CMDB description block
    Describe {
        name: String,
        #[arg(long)]
        impacted_ci: String,
        #[arg(long)]
        affected_ci: String,
        #[arg(long, default_value = "")]
        details: String,
        #[arg(long)]
        overwrite: bool,
    },
    /// Back up one alarm, or every alarm when no name is given
    Backup {
        name: Option<String>,
        #[arg(short, long)]
        path: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    /// Restore an alarm from a backup file
    Restore {
        #[arg(short, long)]
        path: PathBuf,
        name: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum DashboardCommand {
    /// Print a dashboard body
    Get { name: String },
    /// List dashboard names
    List,
    /// Create a dashboard from a JSON file holding one dashboard
    Put {
        file: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    /// Rename a dashboard
    Rename {
        old_name: String,
        new_name: String,
        #[arg(long)]
        keep_old: bool,
    },
    /// Delete a dashboard
    Delete {
        name: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace text anywhere in a dashboard
    Replace {
        name: String,
        search: String,
        replace: String,
        #[arg(long)]
        apply: bool,
    },
    /// Back up one dashboard, or every dashboard when no name is given
    Backup {
        name: Option<String>,
        #[arg(short, long)]
        path: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    /// Restore a dashboard from a backup file
    Restore {
        #[arg(short, long)]
        path: PathBuf,
        name: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SnsCommand {
    /// List topics with their subscription endpoints
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, default_value = "match")]
        mode: MatchMode,
    },
    /// Print a topic's ARN
    Get { name: String },
    /// Create a topic
    Create { name: String },
    /// Delete a topic
    Delete { name: String },
    /// Subscribe an endpoint to a topic
    Subscribe {
        name: String,
        /// email or https
        protocol: SubscriptionProtocol,
        endpoint: String,
    },
    /// List a topic's subscriptions
    Subscriptions { name: String },
}

#[derive(Subcommand)]
pub enum LogsCommand {
    /// List log groups
    Groups,
    /// List metric filters, optionally filtered
    Filters {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, default_value = "match")]
        mode: MatchMode,
        /// all, name or logGroup
        #[arg(long, default_value = "all")]
        search_by: FilterSearchBy,
        /// Print only the filter names
        #[arg(long)]
        names: bool,
    },
    /// Show one metric filter
    Filter { name: String, log_group: String },
    /// Create a metric filter from a JSON file holding one filter
    Put {
        file: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete a metric filter
    Delete {
        name: String,
        log_group: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Back up every metric filter
    Backup {
        #[arg(short, long)]
        path: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    /// Restore a metric filter from a backup file
    Restore {
        #[arg(short, long)]
        path: PathBuf,
        name: String,
        /// Only restore the copy attached to this log group
        #[arg(long)]
        log_group: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &Globals, command: CwCommand) -> Result<()> {
    match command {
        CwCommand::Alarm { command } => run_alarm(ctx, command).await,
        CwCommand::Dashboard { command } => run_dashboard(ctx, command).await,
        CwCommand::Sns { command } => run_sns(ctx, command).await,
        CwCommand::Logs { command } => run_logs(ctx, command).await,
    }
}

fn print_alarm(alarm: &Alarm, out: &mut impl Write) -> std::io::Result<()> {
    match alarm {
        Alarm::Metric(a) => {
            helpers::print_metric_alarms(std::slice::from_ref(a), AlarmField::All, out)
        }
        Alarm::Composite(a) => {
            helpers::print_composite_alarms(std::slice::from_ref(a), AlarmField::All, out)
        }
    }
}

async fn run_alarm(ctx: &Globals, command: AlarmCommand) -> Result<()> {
    let session = ctx.cloudwatch().await?;

    match command {
        AlarmCommand::Get { name } => {
            let alarm = session.get_alarm(&name).await?;
            ctx.emit(&alarm, |out| print_alarm(&alarm, out))?;
        }
        AlarmCommand::List {
            search,
            mode,
            search_by,
            field,
            sort,
            csv,
        } => {
            let mut alarms = session.get_all_alarms().await?;
            if let Some(search) = search {
                alarms = AlarmSet {
                    metric_alarms: helpers::filter_metric_alarms(
                        &alarms.metric_alarms,
                        &search,
                        mode,
                        search_by,
                    )?,
                    composite_alarms: helpers::filter_composite_alarms(
                        &alarms.composite_alarms,
                        &search,
                        mode,
                        search_by,
                    )?,
                };
            }
            if sort {
                alarms.metric_alarms = helpers::sort_alarms(&alarms.metric_alarms);
            }
            info!("{} alarms selected", alarms.len());

            ctx.emit(&alarms, |out| {
                if csv {
                    return helpers::print_alarms_for_csv(&alarms.metric_alarms, out);
                }
                helpers::print_metric_alarms(&alarms.metric_alarms, field, out)?;
                helpers::print_composite_alarms(&alarms.composite_alarms, field, out)
            })?;
        }
        AlarmCommand::Put { file, overwrite } => {
            let alarm: Alarm = snapshot::read_snapshot(&file)?;
            session.put_alarm(&alarm, overwrite).await?;
        }
        AlarmCommand::Rename {
            old_name,
            new_name,
            keep_old,
        } => session.rename_alarm(&old_name, &new_name, keep_old).await?,
        AlarmCommand::Copy { name, new_name } => session.copy_alarm(&name, &new_name).await?,
        AlarmCommand::RenameList => {
            // Ctrl+C stops the loop between alarms instead of killing the process
            let (_terminator_tx, mut interrupts) = termination::create_termination();
            let mut console = Console::stdio();
            if !session.rename_alarms_by_list(&mut console, &mut interrupts).await? {
                info!("bulk rename cancelled");
            }
        }
        AlarmCommand::Delete { name, yes } => session.delete_alarm(&name, yes).await?,
        AlarmCommand::Enable { name } => session.enable_alarm(&name).await?,
        AlarmCommand::Disable { name } => session.disable_alarm(&name).await?,
        AlarmCommand::Replace {
            name,
            search,
            replace,
            apply,
        } => {
            let alarm = session
                .replace_active_alarm_string(&name, &search, &replace, apply)
                .await?;
            ctx.emit(&alarm, |out| print_alarm(&alarm, out))?;
        }
        AlarmCommand::Action {
            name,
            action,
            action_type,
            sns,
        } => {
            if !session
                .modify_alarm_action(&name, action, action_type, &sns)
                .await?
            {
                info!("{action_type} of '{name}' already as requested");
            }
        }
        AlarmCommand::TreatMissing { name, value } => {
            session.modify_alarm_treat_missing_data(&name, value).await?
        }
        AlarmCommand::Describe {
            name,
            impacted_ci,
            affected_ci,
            details,
            overwrite,
        } => {
            let alarm = session
                .modify_alarm_description(&name, &impacted_ci, &affected_ci, &details, overwrite)
                .await?;
            ctx.emit(&alarm, |out| {
                writeln!(out, "{}", alarm.description().unwrap_or_default())
            })?;
        }
        AlarmCommand::Backup {
            name,
            path,
            overwrite,
        } => match name {
            Some(name) => session.backup_alarm(&name, &path, overwrite).await?,
            None => session.backup_all_alarms(&path, overwrite).await?,
        },
        AlarmCommand::Restore { path, name, yes } => {
            let mut console = Console::stdio();
            session.restore_alarm(&path, &name, yes, &mut console).await?;
        }
    }

    Ok(())
}

async fn run_dashboard(ctx: &Globals, command: DashboardCommand) -> Result<()> {
    let session = ctx.cloudwatch().await?;

    match command {
        DashboardCommand::Get { name } => {
            let dashboard = session.get_dashboard(&name).await?;
            ctx.emit(&dashboard, |out| writeln!(out, "{}", dashboard.dashboard_body))?;
        }
        DashboardCommand::List => {
            let dashboards = session.get_all_dashboards().await?;
            let names: Vec<&str> = dashboards.iter().map(|d| d.dashboard_name.as_str()).collect();
            ctx.emit(&names, |out| {
                names.iter().try_for_each(|name| writeln!(out, "{name}"))
            })?;
        }
        DashboardCommand::Put { file, overwrite } => {
            let dashboard: Dashboard = snapshot::read_snapshot(&file)?;
            session.put_dashboard(&dashboard, overwrite).await?;
        }
        DashboardCommand::Rename {
            old_name,
            new_name,
            keep_old,
        } => session.rename_dashboard(&old_name, &new_name, keep_old).await?,
        DashboardCommand::Delete { name, yes } => session.delete_dashboard(&name, yes).await?,
        DashboardCommand::Replace {
            name,
            search,
            replace,
            apply,
        } => {
            let dashboard = session
                .replace_active_dashboard_body_string(&name, &search, &replace, apply)
                .await?;
            ctx.emit(&dashboard, |out| writeln!(out, "{}", dashboard.dashboard_body))?;
        }
        DashboardCommand::Backup {
            name,
            path,
            overwrite,
        } => match name {
            Some(name) => session.backup_dashboard(&name, &path, overwrite).await?,
            None => session.backup_all_dashboards(&path, overwrite).await?,
        },
        DashboardCommand::Restore { path, name, yes } => {
            let mut console = Console::stdio();
            session.restore_dashboard(&path, &name, yes, &mut console).await?;
        }
    }

    Ok(())
}

async fn run_sns(ctx: &Globals, command: SnsCommand) -> Result<()> {
    let session = ctx.cloudwatch().await?;

    match command {
        SnsCommand::List { search, mode } => {
            let mut topics = session.get_all_sns().await?;
            if let Some(search) = search {
                topics = helpers::filter_sns(&topics, &search, mode)?;
            }
            if ctx.json {
                ctx.emit(&topics, |_| Ok(()))?;
            } else {
                let mut out = std::io::stdout().lock();
                session.print_sns(&topics, &mut out).await?;
            }
        }
        SnsCommand::Get { name } => {
            let arn = session.get_sns(&name).await?;
            ctx.emit(&arn, |out| writeln!(out, "{arn}"))?;
        }
        SnsCommand::Create { name } => {
            let arn = session.create_sns(&name).await?;
            ctx.emit(&arn, |out| writeln!(out, "{arn}"))?;
        }
        SnsCommand::Delete { name } => session.delete_sns(&name).await?,
        SnsCommand::Subscribe {
            name,
            protocol,
            endpoint,
        } => session.add_sns_subscription(&name, protocol, &endpoint).await?,
        SnsCommand::Subscriptions { name } => {
            let subscriptions = session.get_sns_subscriptions(&name).await?;
            let rows: Vec<Vec<String>> = subscriptions
                .iter()
                .map(|s| {
                    vec![
                        s.protocol.clone().unwrap_or_default(),
                        s.endpoint.clone().unwrap_or_default(),
                        s.subscription_arn.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            ctx.emit(&subscriptions, |out| {
                helpers::print_table(&["Protocol", "Endpoint", "SubscriptionArn"], &rows, out)
            })?;
        }
    }

    Ok(())
}

async fn run_logs(ctx: &Globals, command: LogsCommand) -> Result<()> {
    let session = ctx.cloudwatch().await?;

    match command {
        LogsCommand::Groups => {
            let groups = session.get_all_log_groups().await?;
            ctx.emit(&groups, |out| helpers::print_log_groups(&groups, out))?;
        }
        LogsCommand::Filters {
            search,
            mode,
            search_by,
            names,
        } => {
            let mut filters = session.get_all_metric_filters().await?;
            if let Some(search) = search {
                filters = helpers::filter_metric_filters(&filters, &search, mode, search_by)?;
            }
            if names {
                let names = helpers::metric_filter_names(&filters);
                ctx.emit(&names, |out| {
                    names.iter().try_for_each(|name| writeln!(out, "{name}"))
                })?;
            } else {
                ctx.emit(&filters, |out| helpers::print_metric_filters(&filters, out))?;
            }
        }
        LogsCommand::Filter { name, log_group } => {
            let filter = session.get_metric_filter(&name, &log_group).await?;
            ctx.emit(&filter, |out| {
                helpers::print_metric_filters(std::slice::from_ref(&filter), out)
            })?;
        }
        LogsCommand::Put { file, overwrite } => {
            let filter: MetricFilter = snapshot::read_snapshot(&file)?;
            session.put_metric_filter(&filter, overwrite).await?;
        }
        LogsCommand::Delete {
            name,
            log_group,
            yes,
        } => session.delete_metric_filter(&name, &log_group, yes).await?,
        LogsCommand::Backup { path, overwrite } => {
            session.backup_all_metric_filters(&path, overwrite).await?
        }
        LogsCommand::Restore {
            path,
            name,
            log_group,
            yes,
        } => {
            let mut console = Console::stdio();
            session
                .restore_metric_filter(&path, &name, log_group.as_deref(), yes, &mut console)
                .await?;
        }
    }

    Ok(())
}
