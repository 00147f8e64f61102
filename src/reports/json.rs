use super::Scorecard;
use crate::Result;
use core::fmt::Write;

pub fn generate<W: Write>(scorecard: &Scorecard, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(scorecard)?)?;
    Ok(())
}
