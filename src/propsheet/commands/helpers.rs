use crate::error::Result;
use crate::host::{Host, PrintedPage, ViewMode};

/// Open `path` in `mode` and run the command `id` on it, returning the pages it
/// produced.
pub(super) fn run_on_document(
    host: &mut Host,
    path: &str,
    mode: ViewMode,
    id: &str,
) -> Result<Vec<PrintedPage>> {
    host.open_document(path, mode)?;
    let before = host.outbox.len();
    host.execute_command(id)?;
    Ok(host.outbox.drain(before..).collect())
}
