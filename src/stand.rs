//! Stand cloning pipeline.
//!
//! Copies a base stand directory tree into a new stand, rewrites the
//! example Terraform/Ansible configuration for the new subnet and stand id,
//! materializes example var files, and emits the Proxmox pool/ACL script.
//!
//! The pipeline is sequential and performs no cleanup of a partially
//! written target when a later step fails.

use color_eyre::eyre::{bail, Result, WrapErr};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::acl;
use crate::rewrite;
use crate::subnet::SubnetAllocation;

/// Substitution flavor, selected by the base stand's directory name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandFlavor {
    Linux,
    Windows,
}

impl StandFlavor {
    /// Detect the flavor from the base directory name.
    pub fn detect(base_name: &str) -> Option<Self> {
        if base_name.contains("linux-stand") {
            Some(StandFlavor::Linux)
        } else if base_name.contains("windows-stand") {
            Some(StandFlavor::Windows)
        } else {
            None
        }
    }
}

/// Parameters for one clone run
#[derive(Debug)]
pub struct CloneRequest<'a> {
    pub base: &'a Path,
    pub name: &'a str,
    pub stand_id: &'a str,
    pub subnet: &'a SubnetAllocation,
    pub pve_user: &'a str,
    pub pve_role: &'a str,
    pub out_dir: &'a Path,
}

/// Clone the base stand into `<out_dir>/<name>` and return the target path.
pub fn clone_stand(request: &CloneRequest) -> Result<PathBuf> {
    let base = request.base;
    if !base.is_dir() {
        bail!("Base stand not found: {}", base.display());
    }
    if !request.out_dir.is_dir() {
        bail!("Output parent not found: {}", request.out_dir.display());
    }

    // Flavor detection happens before the copy so an unrecognized base
    // leaves no filesystem side effects at all.
    let base_name = base
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let Some(flavor) = StandFlavor::detect(&base_name) else {
        bail!("Base stand name must contain 'linux-stand' or 'windows-stand'");
    };

    let target = request.out_dir.join(request.name);
    if target.exists() {
        bail!("Target already exists: {}", target.display());
    }

    info!("Copying {} -> {}", base.display(), target.display());
    copy_tree(base, &target)?;

    info!(
        "Updating {:?} examples for stand '{}' on subnet {}",
        flavor, request.stand_id, request.subnet
    );
    match flavor {
        StandFlavor::Linux => update_linux_examples(&target, request.stand_id, request.subnet)?,
        StandFlavor::Windows => update_windows_examples(&target, request.stand_id, request.subnet)?,
    }

    ensure_ansible_vars(&target)?;
    acl::write_pool_acl_script(&target, request.stand_id, request.pve_user, request.pve_role)?;

    Ok(target)
}

/// Recursively copy a directory tree.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).wrap_err_with(|| format!("Failed to create {}", dst.display()))?;

    for entry in
        fs::read_dir(src).wrap_err_with(|| format!("Failed to read {}", src.display()))?
    {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).wrap_err_with(|| {
                format!(
                    "Failed to copy {} -> {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

fn update_linux_examples(
    stand_dir: &Path,
    stand_id: &str,
    subnet: &SubnetAllocation,
) -> Result<()> {
    let tf_ws = stand_dir.join("infrastructure/terraform/linux-ws/terraform.tfvars.example");
    let tf_srv = stand_dir.join("infrastructure/terraform/linux-server/terraform.tfvars.example");

    rewrite::replace_tfvar(&tf_ws, "linux_ws_name", &format!("{}-linux-ws", stand_id))?;
    rewrite::replace_tfvar(&tf_ws, "linux_ws_ip", &subnet.workstation_ip()?.to_string())?;
    rewrite::replace_tfvar(&tf_ws, "gateway", &subnet.gateway()?.to_string())?;

    rewrite::replace_tfvar(&tf_srv, "linux_server_name", &format!("{}-linux-srv", stand_id))?;
    rewrite::replace_tfvar(&tf_srv, "linux_server_ip", &subnet.server_ip()?.to_string())?;
    rewrite::replace_tfvar(&tf_srv, "gateway", &subnet.gateway()?.to_string())?;

    rewrite::replace_tfvar_int(&tf_ws, "cidr_prefix", subnet.prefix_len() as u32)?;
    rewrite::replace_tfvar_int(&tf_srv, "cidr_prefix", subnet.prefix_len() as u32)?;

    Ok(())
}

fn update_windows_examples(
    stand_dir: &Path,
    stand_id: &str,
    subnet: &SubnetAllocation,
) -> Result<()> {
    let tf_ws = stand_dir.join("infrastructure/terraform/windows-10/terraform.tfvars.example");
    let tf_srv =
        stand_dir.join("infrastructure/terraform/windows-server/terraform.tfvars.example");
    let tf_dc =
        stand_dir.join("infrastructure/terraform/domain-controller/terraform.tfvars.example");

    rewrite::replace_tfvar(&tf_ws, "windows_ws_name", &format!("{}-windows-10", stand_id))?;
    rewrite::replace_tfvar(&tf_ws, "windows_ws_ip", &subnet.workstation_ip()?.to_string())?;

    rewrite::replace_tfvar(
        &tf_srv,
        "windows_server_name",
        &format!("{}-windows-server", stand_id),
    )?;
    rewrite::replace_tfvar(&tf_srv, "windows_server_ip", &subnet.server_ip()?.to_string())?;

    rewrite::replace_tfvar(&tf_dc, "dc_name", &format!("{}-dc", stand_id))?;
    rewrite::replace_tfvar(&tf_dc, "dc_ip", &subnet.domain_controller_ip()?.to_string())?;

    let ad_example = stand_dir.join("infrastructure/ansible/group_vars/all/ad.yml.example");
    if ad_example.exists() {
        update_ad_example(&ad_example, stand_id, subnet)?;
    }

    Ok(())
}

/// Rewrite the Active Directory group vars example for the new stand.
fn update_ad_example(path: &Path, stand_id: &str, subnet: &SubnetAllocation) -> Result<()> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();

    let lines = rewrite::replace_yaml_value(&lines, "ad_stand_id", stand_id)?;
    let lines = rewrite::replace_yaml_value(&lines, "ad_stand_ou", &title_case(stand_id))?;
    let lines = rewrite::replace_yaml_value(
        &lines,
        "ad_dc_ip",
        &subnet.domain_controller_ip()?.to_string(),
    )?;
    let computers = vec![
        format!("{}-windows-10", stand_id),
        format!("{}-windows-server", stand_id),
    ];
    let lines = rewrite::replace_yaml_list(&lines, "ad_stand_computers", &computers)?;

    let mut updated = lines.join("\n");
    updated.push('\n');
    fs::write(path, updated).wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Copy example Ansible var files to their real counterparts when the real
/// file does not exist yet. A no-op for an already-materialized stand.
pub fn ensure_ansible_vars(stand_dir: &Path) -> Result<()> {
    let group_vars = stand_dir.join("infrastructure/ansible/group_vars/all");
    if !group_vars.exists() {
        return Ok(());
    }

    for name in ["accounts.yml", "vulnerabilities.yml"] {
        let example = group_vars.join(format!("{}.example", name));
        let target = group_vars.join(name);
        if example.exists() && !target.exists() {
            fs::copy(&example, &target)
                .wrap_err_with(|| format!("Failed to copy example to {}", target.display()))?;
            info!("Materialized {}", target.display());
        }
    }
    Ok(())
}

/// Uppercase the first letter of each alphabetic run, lowercase the rest,
/// e.g. `stand-02` -> `Stand-02`. Used for the AD organizational unit name.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
