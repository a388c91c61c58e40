use tq_core::snapshot::Snapshot;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `tq schema`: the JSON schema documents accepted by `tq import`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schemars::schema_for!(Snapshot), flags.format)
}
