use super::Scorecard;
use crate::Result;
use crate::data::Metric;
use core::fmt::Write;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;

pub fn generate<W: Write>(scorecard: &Scorecard, use_colors: bool, writer: &mut W) -> Result<()> {
    let title = format!("{} ({})", scorecard.repository, scorecard.window);
    if use_colors {
        writeln!(writer, "{}", title.bold())?;
    } else {
        writeln!(writer, "{title}")?;
    }

    let volume = &scorecard.volume;
    let volume_rows = [
        ("Inbound volume", volume.inbound_volume),
        ("Rejections", volume.rejections),
        ("Adjusted inbound volume", volume.adjusted_inbound_volume),
        ("Output volume", volume.output_volume),
        ("Output volume (enhancements)", volume.output_enhancements),
        ("Output volume (bugs)", volume.output_bugs),
        ("Output volume (tasks)", volume.output_tasks),
        ("Output volume (docs)", volume.output_docs),
        ("Still open", volume.still_open),
    ];

    let stats_rows: Vec<_> = Metric::iter()
        .map(|metric| (metric.description(), scorecard.stats.get(metric)))
        .collect();

    let width = stats_rows
        .iter()
        .chain(volume_rows.iter())
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    write_section(writer, "Stats", &stats_rows, width, use_colors)?;
    write_section(writer, "Volume", &volume_rows, width, use_colors)?;

    writeln!(writer)?;
    if scorecard.inconsistencies.is_empty() {
        let message = "Both strategies agree on every metric";
        if use_colors {
            writeln!(writer, "{}", message.green())?;
        } else {
            writeln!(writer, "{message}")?;
        }
    } else {
        write_heading(writer, "Inconsistencies", use_colors)?;
        for inconsistency in &scorecard.inconsistencies {
            let line = inconsistency.to_string();
            if use_colors {
                writeln!(writer, "  {}", line.yellow())?;
            } else {
                writeln!(writer, "  {line}")?;
            }
        }
    }

    if !scorecard.assignable_users.is_empty() {
        writeln!(writer)?;
        write_heading(writer, "Assignable users", use_colors)?;
        writeln!(writer, "  {}", scorecard.assignable_users.join(", "))?;
    }

    Ok(())
}

fn write_section<W: Write>(writer: &mut W, heading: &str, rows: &[(&str, u64)], width: usize, use_colors: bool) -> Result<()> {
    writeln!(writer)?;
    write_heading(writer, heading, use_colors)?;
    for (name, value) in rows {
        writeln!(writer, "  {name:<width$} : {value}")?;
    }

    Ok(())
}

fn write_heading<W: Write>(writer: &mut W, heading: &str, use_colors: bool) -> Result<()> {
    if use_colors {
        writeln!(writer, "{}", heading.bold())?;
    } else {
        writeln!(writer, "{heading}")?;
    }

    Ok(())
}
