use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use standgen::stand::{clone_stand, CloneRequest};
use standgen::subnet::SubnetAllocation;

/// Stand cloning utility for Proxmox/Terraform training labs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base stand directory, e.g. stands/linux-stand
    #[arg(long)]
    base: PathBuf,

    /// New stand directory name, e.g. linux-stand-02
    #[arg(long)]
    name: String,

    /// Stand ID/prefix, e.g. stand-02 (defaults to --name)
    #[arg(long)]
    stand_id: Option<String>,

    /// Subnet CIDR, e.g. 192.168.103.0/24
    #[arg(long)]
    subnet: String,

    /// Proxmox user for the pool ACL script
    #[arg(long, default_value = "student01@pve")]
    pve_user: String,

    /// Proxmox role for the pool ACL script
    #[arg(long, default_value = "StudentVM")]
    pve_role: String,

    /// Target parent directory for the new stand
    #[arg(long, default_value = "stands")]
    out_dir: PathBuf,
}

fn run(args: &Args) -> Result<PathBuf> {
    let stand_id = args.stand_id.as_deref().unwrap_or(&args.name);
    let subnet = SubnetAllocation::parse(&args.subnet)?;

    info!("Base stand: {:?}", args.base);
    info!("New stand: {:?} (id: {})", args.name, stand_id);
    info!("Subnet: {}", subnet);

    clone_stand(&CloneRequest {
        base: &args.base,
        name: &args.name,
        stand_id,
        subnet: &subnet,
        pve_user: &args.pve_user,
        pve_role: &args.pve_role,
        out_dir: &args.out_dir,
    })
}

fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("ERROR: {}", err);
        return ExitCode::from(2);
    }

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run(&args) {
        Ok(target) => {
            println!("OK: created {}", target.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            ExitCode::from(2)
        }
    }
}
