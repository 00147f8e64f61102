use serde::Serialize;

/// Volume figures that only the query-composition strategy can produce, since they rely on
/// milestone and later-closure information that the in-memory fetch does not cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeReport {
    /// Issues created in the window, minus those authored by team members or bots
    pub inbound_volume: u64,

    /// Issues closed in the window with a rejection label
    pub rejections: u64,

    /// Issues created in the window, minus those created and closed in the window without a milestone
    pub adjusted_inbound_volume: u64,

    /// Issues created and closed in the window with a milestone, minus back/forward-ports
    pub output_volume: u64,

    pub output_enhancements: u64,
    pub output_bugs: u64,
    pub output_tasks: u64,
    pub output_docs: u64,

    /// Issues created in the window that were not closed by its end
    pub still_open: u64,
}
