//! Launch profile (`version.json`) patching.
//!
//! The forge jar embeds a launcher profile. The launcher honours a
//! `javaArguments` key, which is set to a fixed option string and placed
//! directly after `minecraftArguments`. Any previous `javaArguments` value is
//! replaced.

use crate::error::ArchiveError;
use serde_json::{Map, Value};

/// Name of the launch profile inside the forge jar and the runtime archive.
pub const DESCRIPTOR_NAME: &str = "version.json";

const ANCHOR_KEY: &str = "minecraftArguments";
const OPTIONS_KEY: &str = "javaArguments";

/// JVM options injected into every client launch.
pub const JAVA_ARGUMENTS: &[&str] = &[
    "-Dcom.sun.management.jmxremote",
    "-Dcom.sun.management.jmxremote.ssl=false",
    "-Dcom.sun.management.jmxremote.authenticate=false",
    "-Dcom.sun.management.jmxremote.local.only=true",
    "-Dcom.sun.management.jmxremote.port=9010",
    "-Dfml.readTimeout=120",
];

/// Return the descriptor with [`JAVA_ARGUMENTS`] injected.
///
/// Fails if the descriptor is not a JSON object or lacks `minecraftArguments`.
pub fn inject_runtime_options(descriptor: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let value: Value = serde_json::from_slice(descriptor)
        .map_err(|e| ArchiveError::InvalidDescriptor(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ArchiveError::InvalidDescriptor(
            "expected a JSON object".to_string(),
        ));
    };
    if !fields.contains_key(ANCHOR_KEY) {
        return Err(ArchiveError::InvalidDescriptor(format!(
            "missing {ANCHOR_KEY}"
        )));
    }

    let mut patched = Map::with_capacity(fields.len() + 1);
    for (key, value) in fields {
        if key == OPTIONS_KEY {
            continue;
        }
        let anchor = key == ANCHOR_KEY;
        patched.insert(key, value);
        if anchor {
            patched.insert(
                OPTIONS_KEY.to_string(),
                Value::String(JAVA_ARGUMENTS.join(" ")),
            );
        }
    }

    let mut out = serde_json::to_vec_pretty(&Value::Object(patched))
        .map_err(|e| ArchiveError::InvalidDescriptor(e.to_string()))?;
    out.push(b'\n');
    Ok(out)
}
