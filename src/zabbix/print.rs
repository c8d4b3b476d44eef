use std::io::{self, Write};

use super::models::{CmdbTagGap, Trigger};
use crate::helpers::print_table;

pub const WRAP_WIDTH: usize = 200;

const RECOVERY_SAME: &str = "Same as expression";

/// Greedy word wrap. Continuation lines are indented to the prefix width.
/// Words wider than a whole line are split across lines.
pub fn wrap(prefix: &str, text: &str, width: usize) -> String {
    let indent = " ".repeat(prefix.chars().count());
    let indent_len = indent.len();
    let mut lines: Vec<String> = Vec::new();
    let mut line = prefix.to_string();
    let mut line_len = indent_len;
    let mut line_has_word = false;

    for word in text.split_whitespace() {
        let mut rest: Vec<char> = word.chars().collect();
        let splits = rest.len() > width.saturating_sub(indent_len);

        while !rest.is_empty() {
            let needed = if splits { 1 } else { rest.len() };
            if line_has_word && line_len + 1 + needed > width {
                lines.push(std::mem::replace(&mut line, indent.clone()));
                line_len = indent_len;
                line_has_word = false;
            }
            if line_has_word {
                line.push(' ');
                line_len += 1;
            }
            let take = width.saturating_sub(line_len).max(1).min(rest.len());
            line.extend(rest.drain(..take));
            line_len += take;
            line_has_word = true;
        }
    }
    lines.push(line.trim_end().to_string());
    lines.join("\n")
}

fn recovery(t: &Trigger) -> &str {
    if t.recovery_expression.is_empty() {
        RECOVERY_SAME
    } else {
        &t.recovery_expression
    }
}

fn tag_list(t: &Trigger, separator: &str) -> String {
    t.tags
        .iter()
        .map(|tag| format!("{}:{}", tag.tag, tag.value))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Writes a block per trigger, or one `::`-delimited row per trigger when
/// `csv` is set.
pub fn print_triggers(triggers: &[Trigger], csv: bool, out: &mut impl Write) -> io::Result<()> {
    for t in triggers {
        let comments = t.comments.replace("\r\n", "");

        if csv {
            writeln!(
                out,
                "{}::{}::{}::{}::{}::{}::{}",
                t.triggerid,
                t.description,
                t.templateid,
                tag_list(t, ","),
                t.expression,
                recovery(t),
                comments
            )?;
            continue;
        }

        writeln!(out)?;
        writeln!(out, "TriggerId : {}", t.triggerid)?;
        writeln!(out, "  Overview")?;
        writeln!(out, "  - Name        : {}", t.description)?;
        writeln!(out, "  - Priority    : {}", t.priority_name())?;
        writeln!(out, "  - TemplateId  : {}", t.templateid)?;
        writeln!(out, "{}", wrap("  - Tags        : ", &tag_list(t, " "), WRAP_WIDTH))?;
        writeln!(out, "  Conditions")?;
        writeln!(out, "{}", wrap("  - Expression  : ", &t.expression, WRAP_WIDTH))?;
        writeln!(out, "{}", wrap("  - Recovery    : ", recovery(t), WRAP_WIDTH))?;
        writeln!(out, "{}", wrap("  - Description : ", &comments, WRAP_WIDTH))?;
    }
    Ok(())
}

pub fn print_cmdb_gaps(gaps: &[CmdbTagGap], out: &mut impl Write) -> io::Result<()> {
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let rows: Vec<Vec<String>> = gaps
        .iter()
        .map(|g| {
            vec![
                g.host.clone(),
                g.triggerid.clone(),
                g.description.clone(),
                dash(&g.impacted_ci),
                dash(&g.affected_ci),
            ]
        })
        .collect();
    print_table(
        &["Host", "TriggerId", "Name", "impacted_ci", "affected_ci"],
        &rows,
        out,
    )
}
