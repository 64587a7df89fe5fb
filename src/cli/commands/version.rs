//! Version information.

use crate::error::Result;

/// Execute the version command.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    if json {
        println!(
            "{}",
            serde_json::json!({ "name": "memkeep", "version": version })
        );
    } else {
        println!("memkeep {version}");
    }
    Ok(())
}
