//! Proxmox pool/ACL setup script emission.
//!
//! Every generated stand ships a small shell script that an administrator
//! runs on the Proxmox node to create the student role, user, and resource
//! pool for the stand, and to bind the ACL.

use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `infrastructure/scripts/proxmox_pool_acl.sh` into the stand and
/// return its path.
pub fn write_pool_acl_script(
    stand_dir: &Path,
    stand_id: &str,
    pve_user: &str,
    pve_role: &str,
) -> Result<PathBuf> {
    let scripts_dir = stand_dir.join("infrastructure/scripts");
    fs::create_dir_all(&scripts_dir)
        .wrap_err_with(|| format!("Failed to create {}", scripts_dir.display()))?;

    let script_path = scripts_dir.join("proxmox_pool_acl.sh");
    let content = format!(
        r#"#!/usr/bin/env bash
set -euo pipefail

# Proxmox pool/ACL setup for stand: {stand_id}
# Run on the Proxmox node with administrator privileges.

POOL_ID="{stand_id}"
ROLE="{role}"
USER="{user}"

# 1) Role (minimal privileges)
pveum role add "$ROLE" -privs "VM.Audit VM.Console VM.PowerMgmt" || true

# 2) User (local pve realm)
pveum user add "$USER" || true
# pveum passwd "$USER"  # set the password manually

# 3) Pool
pvesh create /pools -poolid "$POOL_ID" || true

# 4) ACL on the pool
pveum aclmod "/pool/$POOL_ID" -user "$USER" -role "$ROLE"

echo "Done. Add your VMIDs to pool: $POOL_ID"
"#,
        stand_id = stand_id,
        role = pve_role,
        user = pve_user,
    );

    fs::write(&script_path, content)
        .wrap_err_with(|| format!("Failed to write {}", script_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&script_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms)?;
    }

    Ok(script_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_script_interpolation() {
        let dir = tempdir().unwrap();
        let path =
            write_pool_acl_script(dir.path(), "stand-02", "student02@pve", "StudentVM").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("#!/usr/bin/env bash"));
        assert!(content.contains("POOL_ID=\"stand-02\""));
        assert!(content.contains("ROLE=\"StudentVM\""));
        assert!(content.contains("USER=\"student02@pve\""));
        assert!(content.contains("pveum aclmod \"/pool/$POOL_ID\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_script_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path =
            write_pool_acl_script(dir.path(), "stand-02", "student02@pve", "StudentVM").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
