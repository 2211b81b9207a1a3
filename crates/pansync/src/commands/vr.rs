//! Virtual router command handlers.

use pansync_core::xpath;
use pansync_core::{Operation, ReconcileRequest, StaticRouteSpec};

use crate::cli::{GlobalOpts, NextHopType, VrArgs, VrCommand};
use crate::error::CliError;

pub async fn handle(args: VrArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        VrCommand::Add { name } => {
            let request = ReconcileRequest::VirtualRouter {
                op: Operation::Create,
                name,
            };
            super::run_reconcile(request, global).await
        }

        VrCommand::Del { name } => {
            let request = ReconcileRequest::VirtualRouter {
                op: Operation::Delete,
                name,
            };
            super::run_reconcile(request, global).await
        }

        VrCommand::RouteAdd {
            vr,
            name,
            destination,
            next_hop,
            next_hop_type,
        } => {
            let spec = StaticRouteSpec {
                virtual_router: vr,
                name,
                destination,
                next_hop,
                next_hop_kind: next_hop_token(&next_hop_type).to_string(),
            };
            let request = ReconcileRequest::StaticRoute {
                op: Operation::CreateStatic,
                spec,
            };
            super::run_reconcile(request, global).await
        }

        VrCommand::Show { name } => {
            xpath::validate_name("virtual router name", &name)?;
            let path = xpath::virtual_router(&name);
            super::show(&name, &path, global).await
        }
    }
}

/// The engine's next-hop token for a parsed `--next-hop-type`.
fn next_hop_token(kind: &NextHopType) -> &'static str {
    match kind {
        NextHopType::Ip => "ip",
        NextHopType::NextVr => "next-vr",
    }
}
