//! Derives the (flavour, version) identity of a live server.

use crate::ports::{AdminCommand, ConnectionError, ServerConnection};
use dbfixtures_types::{Flavour, ServerIdentity, Version};
use tracing::debug;

/// Server parameter only Percona Server for MongoDB exposes.
pub const VENDOR_PROBE_PARAMETER: &str = "profilingRateLimit";

/// `{ getParameter: 1, profilingRateLimit: true }` against admin.
pub fn vendor_probe_command() -> AdminCommand {
    AdminCommand::new("getParameter").with_option(VENDOR_PROBE_PARAMETER, true)
}

/// Asks the server whether it exposes the vendor-only parameter.
///
/// `Ok(false)` means the server answered and does not have it; an `Err` means
/// the question could not be asked.
pub fn probe_vendor_fork(conn: &dyn ServerConnection) -> Result<bool, ConnectionError> {
    let reply = conn.run_command(&vendor_probe_command())?;
    Ok(reply.ok)
}

/// Resolves the identity fixtures for `conn` are filed under.
///
/// Upstream builds report a plain version. Vendor builds append a `-<release>`
/// suffix, so only then is the vendor probe run.
pub fn resolve(conn: &dyn ServerConnection) -> Result<ServerIdentity, ConnectionError> {
    let raw = conn.build_version()?;
    let version = Version::normalize(&raw);
    if version.as_str().is_empty() {
        return Err(ConnectionError::InvalidReply {
            command: "buildInfo".to_string(),
            message: format!("empty version string '{raw}'"),
        });
    }

    let flavour = match Version::suffix_of(&raw) {
        Some(suffix) => {
            let is_vendor = probe_vendor_fork(conn)?;
            debug!(raw = %raw, suffix = %suffix, is_vendor, "probed vendor flavour");
            if is_vendor {
                Flavour::PerconaServerForMongoDb
            } else {
                Flavour::MongoDb
            }
        }
        None => Flavour::MongoDb,
    };

    Ok(ServerIdentity { flavour, version })
}
