// src/backfill.rs

use crate::error::Result;
use crate::model::{MethodOccurrence, PackageCoordinate, ViolationMap};
use crate::store::MethodStore;
use tracing::{debug, info};

/// Which implicated occurrences get their identifier looked up again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackfillMode {
    /// Every occurrence, rebinding it to the identifier in the input version
    #[default]
    Rebind,
    /// Only occurrences the store left without an identifier
    Unresolved,
}

/// Resolves implicated occurrences to the identifier stored for the same
/// signature in the version the user asked about. A package without an input
/// coordinate, or a signature absent from that version, resolves to `None`.
pub fn backfill(
    violations: ViolationMap,
    input: &[PackageCoordinate],
    store: &dyn MethodStore,
    mode: BackfillMode,
) -> Result<ViolationMap> {
    let mut resolved = 0usize;
    let mut missing = 0usize;

    let mut lookup = |mut occurrence: MethodOccurrence| -> Result<MethodOccurrence> {
        if mode == BackfillMode::Unresolved && occurrence.occurrence_id.is_some() {
            return Ok(occurrence);
        }

        let id = match input_version(input, &occurrence.package_name) {
            Some(version) => store.occurrence_id(&occurrence.package_name, version, &occurrence.signature)?,
            None => None,
        };
        match id {
            Some(_) => resolved += 1,
            None => {
                missing += 1;
                debug!(package = %occurrence.package_name, signature = %occurrence.signature, "no stored identifier");
            }
        }
        occurrence.occurrence_id = id;
        Ok(occurrence)
    };

    let mut backfilled = ViolationMap::with_capacity(violations.len());
    for (group, record) in violations {
        backfilled.insert(group, record.map_occurrences(&mut lookup)?);
    }

    info!(resolved, missing, "backfilled occurrence identifiers");
    Ok(backfilled)
}

/// The version of the last input coordinate naming `package_name`.
fn input_version<'a>(input: &'a [PackageCoordinate], package_name: &str) -> Option<&'a str> {
    input
        .iter()
        .rev()
        .find(|coordinate| coordinate.package_name() == package_name)
        .map(|coordinate| coordinate.version.as_str())
}
