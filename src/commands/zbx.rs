//! `fomo zbx ...` commands.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Subcommand, ValueEnum};

use fomo::core::{MaintenanceSearchBy, TemplateSearchBy};
use fomo::helpers::print_table;
use fomo::zabbix::print::{print_cmdb_gaps, print_triggers};
use fomo::zabbix::{Host, Item, Maintenance, Tag, Template};

use super::Globals;

#[derive(Subcommand)]
pub enum ZbxCommand {
    /// Hosts
    Host {
        #[command(subcommand)]
        command: HostCommand,
    },
    /// Templates
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
    /// Triggers, trigger prototypes and their tags
    Trigger {
        #[command(subcommand)]
        command: TriggerCommand,
    },
    /// Maintenance profiles
    Maintenance {
        #[command(subcommand)]
        command: MaintenanceCommand,
    },
    /// Items
    Item {
        #[command(subcommand)]
        command: ItemCommand,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum HostState {
    All,
    Maintenance,
    Disabled,
    Unmonitored,
}

#[derive(Subcommand)]
pub enum HostCommand {
    /// Show one host by technical name
    Get {
        name: String,
        /// Include the ids of the host's triggers
        #[arg(long)]
        triggers: bool,
    },
    /// List hosts
    List {
        #[arg(long, value_enum, default_value = "all")]
        state: HostState,
    },
    /// Show the triggers of a host
    Triggers {
        name: String,
        /// Skip triggers inherited from templates
        #[arg(long)]
        exclude_template: bool,
        /// Skip triggers created by low-level discovery
        #[arg(long)]
        exclude_discovered: bool,
        #[arg(long)]
        csv: bool,
    },
    /// Host triggers missing impacted_ci or affected_ci tags
    CmdbReport,
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// Look templates up
    Get {
        /// name, template_ids or trigger_ids
        #[arg(long, default_value = "name")]
        search_by: TemplateSearchBy,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// List every template
    List,
    /// Show the triggers of a template
    Triggers {
        name: String,
        #[arg(long)]
        csv: bool,
    },
}

#[derive(Subcommand)]
pub enum TriggerCommand {
    /// Show triggers by id
    Get {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Only triggers inherited from templates
        #[arg(long, conflicts_with = "discovered")]
        templated: bool,
        /// Only triggers created by low-level discovery
        #[arg(long)]
        discovered: bool,
        /// Look the ids up as trigger prototypes
        #[arg(long, conflicts_with_all = ["templated", "discovered"])]
        prototype: bool,
        #[arg(long)]
        csv: bool,
    },
    /// Add a tag to a trigger
    Tag {
        id: String,
        key: String,
        value: String,
        #[arg(long)]
        prototype: bool,
    },
    /// Set the impacted_ci and affected_ci tags
    Cmdb {
        id: String,
        #[arg(long)]
        impacted_ci: String,
        #[arg(long)]
        affected_ci: String,
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        prototype: bool,
    },
}

#[derive(Subcommand)]
pub enum MaintenanceCommand {
    /// Look maintenance profiles up
    Get {
        /// name or maintenance_ids
        #[arg(long, default_value = "name")]
        search_by: MaintenanceSearchBy,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// List maintenance profiles
    List {
        /// Only profiles whose window covers the current time
        #[arg(long)]
        active: bool,
    },
}

#[derive(Subcommand)]
pub enum ItemCommand {
    /// Show items by id
    Get {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub async fn run(ctx: &Globals, command: ZbxCommand) -> Result<()> {
    let session = ctx.zabbix().await?;

    match command {
        ZbxCommand::Host { command } => match command {
            HostCommand::Get { name, triggers } => {
                let host = session.get_host(&name, triggers).await?;
                ctx.emit(&host, |out| print_hosts(std::slice::from_ref(&host), out))?;
            }
            HostCommand::List { state } => {
                let hosts = match state {
                    HostState::All => session.get_all_hosts().await?,
                    HostState::Maintenance => session.get_hosts_in_maintenance().await?,
                    HostState::Disabled => session.get_hosts_disabled().await?,
                    HostState::Unmonitored => session.get_unmonitored_hosts().await?,
                };
                ctx.emit(&hosts, |out| print_hosts(&hosts, out))?;
            }
            HostCommand::Triggers {
                name,
                exclude_template,
                exclude_discovered,
                csv,
            } => {
                let triggers = session
                    .get_host_triggers(&name, exclude_template, exclude_discovered)
                    .await?;
                ctx.emit(&triggers, |out| print_triggers(&triggers, csv, out))?;
            }
            HostCommand::CmdbReport => {
                let gaps = session.get_host_trigger_cmdb_tags().await?;
                ctx.emit(&gaps, |out| print_cmdb_gaps(&gaps, out))?;
            }
        },
        ZbxCommand::Template { command } => match command {
            TemplateCommand::Get { search_by, values } => {
                let templates = session.get_templates(search_by, &values).await?;
                ctx.emit(&templates, |out| print_templates(&templates, out))?;
            }
            TemplateCommand::List => {
                let templates = session.get_all_templates().await?;
                ctx.emit(&templates, |out| print_templates(&templates, out))?;
            }
            TemplateCommand::Triggers { name, csv } => {
                let triggers = session.get_template_triggers(&name).await?;
                ctx.emit(&triggers, |out| print_triggers(&triggers, csv, out))?;
            }
        },
        ZbxCommand::Trigger { command } => match command {
            TriggerCommand::Get {
                ids,
                templated,
                discovered,
                prototype,
                csv,
            } => {
                let triggers = if prototype {
                    session.get_trigger_prototypes(&ids).await?
                } else if templated {
                    session.get_triggers_templated(&ids).await?
                } else if discovered {
                    session.get_triggers_discovered(&ids).await?
                } else {
                    session.get_triggers(&ids).await?
                };
                ctx.emit(&triggers, |out| print_triggers(&triggers, csv, out))?;
            }
            TriggerCommand::Tag {
                id,
                key,
                value,
                prototype,
            } => {
                let tags = if prototype {
                    session.add_tag_triggerprototype(&id, &key, &value).await?
                } else {
                    session.add_tag_trigger(&id, &key, &value).await?
                };
                ctx.emit(&tags, |out| print_tags(&tags, out))?;
            }
            TriggerCommand::Cmdb {
                id,
                impacted_ci,
                affected_ci,
                overwrite,
                prototype,
            } => {
                let tags = if prototype {
                    session
                        .tag_triggerprototype_for_cmdb(&id, &impacted_ci, &affected_ci, overwrite)
                        .await?
                } else {
                    session
                        .tag_trigger_for_cmdb(&id, &impacted_ci, &affected_ci, overwrite)
                        .await?
                };
                ctx.emit(&tags, |out| print_tags(&tags, out))?;
            }
        },
        ZbxCommand::Maintenance { command } => {
            let profiles = match command {
                MaintenanceCommand::Get { search_by, values } => {
                    session.get_maint_profiles(search_by, &values).await?
                }
                MaintenanceCommand::List { active } => {
                    session.get_all_maint_profiles(active).await?
                }
            };
            ctx.emit(&profiles, |out| print_maintenance(&profiles, out))?;
        }
        ZbxCommand::Item { command } => match command {
            ItemCommand::Get { ids } => {
                let items = session.get_items(&ids).await?;
                ctx.emit(&items, |out| print_items(&items, out))?;
            }
        },
    }

    Ok(())
}

fn status(value: &str, on: &str, off: &str) -> String {
    let text = if value == "1" { on } else { off };
    text.to_string()
}

fn print_hosts(hosts: &[Host], out: &mut impl Write) -> std::io::Result<()> {
    let rows: Vec<Vec<String>> = hosts
        .iter()
        .map(|h| {
            vec![
                h.hostid.clone(),
                h.host.clone(),
                h.name.clone(),
                status(&h.status, "disabled", "enabled"),
                status(&h.maintenance_status, "yes", "no"),
                h.triggers.len().to_string(),
            ]
        })
        .collect();
    print_table(
        &["HostId", "Host", "Name", "Status", "Maintenance", "Triggers"],
        &rows,
        out,
    )
}

fn print_templates(templates: &[Template], out: &mut impl Write) -> std::io::Result<()> {
    let rows: Vec<Vec<String>> = templates
        .iter()
        .map(|t| {
            vec![
                t.templateid.clone(),
                t.host.clone(),
                t.triggers.len().to_string(),
                t.discoveries.len().to_string(),
            ]
        })
        .collect();
    print_table(&["TemplateId", "Template", "Triggers", "Discovery rules"], &rows, out)
}

fn print_tags(tags: &[Tag], out: &mut impl Write) -> std::io::Result<()> {
    for tag in tags {
        writeln!(out, "{}:{}", tag.tag, tag.value)?;
    }
    Ok(())
}

fn print_items(items: &[Item], out: &mut impl Write) -> std::io::Result<()> {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|i| vec![i.itemid.clone(), i.hostid.clone(), i.name.clone(), i.key.clone()])
        .collect();
    print_table(&["ItemId", "HostId", "Name", "Key"], &rows, out)
}

fn timestamp(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

fn print_maintenance(profiles: &[Maintenance], out: &mut impl Write) -> std::io::Result<()> {
    let now = Utc::now().timestamp();
    let rows: Vec<Vec<String>> = profiles
        .iter()
        .map(|m| {
            let hosts: Vec<&str> = m.hosts.iter().map(|h| h.host.as_str()).collect();
            vec![
                m.maintenanceid.clone(),
                m.name.clone(),
                timestamp(m.active_since),
                timestamp(m.active_till),
                if m.is_active_at(now) { "yes" } else { "no" }.to_string(),
                hosts.join(", "),
            ]
        })
        .collect();
    print_table(
        &["MaintenanceId", "Name", "Since", "Till", "Active", "Hosts"],
        &rows,
        out,
    )
}
