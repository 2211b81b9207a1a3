//! Interface command handlers.

use pansync_core::xpath;
use pansync_core::{InterfaceSpec, Operation, ReconcileRequest};

use crate::cli::{GlobalOpts, InterfaceArgs, InterfaceCommand, InterfaceMode};
use crate::error::CliError;

pub async fn handle(args: InterfaceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        InterfaceCommand::Add {
            name,
            mode,
            address,
            zone,
            vr,
            default_route,
        } => {
            let spec = InterfaceSpec {
                name,
                mode: mode_token(&mode).to_string(),
                address,
                virtual_router: vr,
                zone,
                create_default_route: default_route,
            };
            let request = ReconcileRequest::Interface {
                op: Operation::Create,
                spec,
            };
            super::run_reconcile(request, global).await
        }

        InterfaceCommand::Show { name } => {
            xpath::validate_name("interface name", &name)?;
            let path = xpath::ethernet_interface(&name);
            super::show(&name, &path, global).await
        }
    }
}

/// The engine's addressing-mode token for a parsed `--mode`.
fn mode_token(mode: &InterfaceMode) -> &'static str {
    match mode {
        InterfaceMode::Dhcp => "dhcp",
        InterfaceMode::Static => "static",
    }
}
