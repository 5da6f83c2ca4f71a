
/// Events emitted during generation that renderers can handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// Carvers are running
    Started { seed: u64 },

    /// Progress update, polled once per frame
    Progress { steps: u64, carved: usize },

    /// Every carver ran out of cells
    Completed { steps: u64 },

    /// Generation was stopped before completing
    Cancelled { steps: u64 },
}
