//! # Standgen - Stand cloning utility for Proxmox/Terraform training labs
//!
//! This library clones a "base stand" (a template directory tree of
//! Terraform and Ansible configuration describing one training environment)
//! into a new stand directory, substituting network parameters into the
//! example configuration files.
//!
//! ## Overview
//!
//! A training lab runs many identical stands, each on its own subnet with
//! its own VM names and Proxmox resource pool. Standgen produces a new
//! stand from a checked-in base template in one invocation: it copies the
//! tree, rewrites hostnames, IPs, and the CIDR prefix in the
//! `terraform.tfvars.example` files, updates the Active Directory group
//! vars for Windows stands, materializes example Ansible var files, and
//! emits a Proxmox pool/ACL setup script.
//!
//! ## Architecture
//!
//! The library is organized into a few small modules:
//!
//! - `subnet`: CIDR parsing and role-based IP assignment (gateway +1,
//!   workstation +10, server +20, domain controller +30)
//! - `rewrite`: line-level rewriting of tfvars and flat YAML files
//! - `stand`: the clone pipeline (copy, substitute, materialize)
//! - `acl`: Proxmox pool/ACL setup script emission
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use standgen::stand::{clone_stand, CloneRequest};
//! use standgen::subnet::SubnetAllocation;
//! use std::path::Path;
//!
//! let subnet = SubnetAllocation::parse("192.168.103.0/24")?;
//! let target = clone_stand(&CloneRequest {
//!     base: Path::new("stands/linux-stand"),
//!     name: "linux-stand-02",
//!     stand_id: "stand-02",
//!     subnet: &subnet,
//!     pve_user: "student02@pve",
//!     pve_role: "StudentVM",
//!     out_dir: Path::new("stands"),
//! })?;
//! println!("created {}", target.display());
//! # Ok::<(), color_eyre::Report>(())
//! ```
//!
//! ## Error Handling
//!
//! All failures surface as a single `color_eyre` error with a descriptive
//! message; the binary prints a one-line diagnostic and exits with status 2.
//! Nothing is retried, and a partially written target is not cleaned up.

pub mod acl;
pub mod rewrite;
pub mod stand;
pub mod subnet;
