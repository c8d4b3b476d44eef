//! The three-line CMDB layout used for alarm descriptions:
//!
//! ```text
//! Impacted_CI: <ci>
//! Affected_CI: <ci>
//! Details: <free text>
//! ```

use crate::error::{FomoError, Result};

pub const IMPACTED_CI: &str = "Impacted_CI";
pub const AFFECTED_CI: &str = "Affected_CI";
pub const DETAILS: &str = "Details";

const LABELS: [&str; 3] = [IMPACTED_CI, AFFECTED_CI, DETAILS];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionChange {
    pub field: &'static str,
    pub from: String,
    pub to: String,
}

// text after `label` when the line starts with it; accepts "Label: v" and "Label v"
fn label_rest<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(label)?;
    let delimited = rest.is_empty() || rest.starts_with(|c: char| c == ':' || c.is_whitespace());
    delimited.then_some(rest)
}

fn is_labelled(line: &str) -> bool {
    LABELS.iter().any(|label| label_rest(line, label).is_some())
}

// value of the last line starting with `label`
fn labelled_value(lines: &[&str], label: &str) -> String {
    lines
        .iter()
        .rev()
        .find_map(|line| label_rest(line, label))
        .map(|rest| rest.trim_start().trim_start_matches(':').trim().to_string())
        .unwrap_or_default()
}

fn check(
    field: &'static str,
    current: &str,
    requested: &str,
    overwrite: bool,
    changes: &mut Vec<DescriptionChange>,
) -> Result<()> {
    if current.is_empty() || current == requested {
        return Ok(());
    }
    if !overwrite {
        return Err(FomoError::DescriptionConflict {
            field,
            current: current.to_string(),
            requested: requested.to_string(),
        });
    }
    changes.push(DescriptionChange {
        field,
        from: current.to_string(),
        to: requested.to_string(),
    });
    Ok(())
}

/// Rewrites `current` into the CMDB layout.
///
/// Empty `details` keeps the existing details. Lines without a label are
/// folded into the details.
pub fn compose_cmdb_description(
    current: &str,
    impacted_ci: &str,
    affected_ci: &str,
    details: &str,
    overwrite: bool,
) -> Result<(String, Vec<DescriptionChange>)> {
    let lines: Vec<&str> = current.lines().collect();
    let mut changes = Vec::new();

    let current_impacted = labelled_value(&lines, IMPACTED_CI);
    check(IMPACTED_CI, &current_impacted, impacted_ci, overwrite, &mut changes)?;

    let current_affected = labelled_value(&lines, AFFECTED_CI);
    check(AFFECTED_CI, &current_affected, affected_ci, overwrite, &mut changes)?;

    let current_details = labelled_value(&lines, DETAILS);
    let details = if details.trim().is_empty() {
        current_details
    } else {
        check(DETAILS, &current_details, details.trim(), overwrite, &mut changes)?;
        details.trim().to_string()
    };

    let mut detail_parts = vec![details];
    detail_parts.extend(
        lines
            .iter()
            .filter(|l| !is_labelled(l))
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
    );
    let details = detail_parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let description = format!(
        "{IMPACTED_CI}: {impacted_ci}\n{AFFECTED_CI}: {affected_ci}\n{DETAILS}: {details}"
    );
    Ok((description, changes))
}
