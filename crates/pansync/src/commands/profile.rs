//! Management profile command handlers.

use pansync_core::xpath;
use pansync_core::{MgmtProfileSpec, Operation, ReconcileRequest, ServiceFlags};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;

pub async fn handle(args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfileCommand::Add {
            name,
            http,
            https,
            http_ocsp,
            ssh,
            snmp,
            userid_service,
            userid_syslog_listener_ssl,
            userid_syslog_listener_udp,
            no_ping,
            response_pages,
            telnet,
            permit,
        } => {
            let services = ServiceFlags {
                http,
                https,
                http_ocsp,
                ssh,
                snmp,
                userid_service,
                userid_syslog_listener_ssl,
                userid_syslog_listener_udp,
                ping: !no_ping,
                response_pages,
                telnet,
            };
            let spec = MgmtProfileSpec {
                name,
                services,
                permitted_ips: permit,
            };
            let request = ReconcileRequest::MgmtProfile {
                op: Operation::Create,
                spec,
            };
            super::run_reconcile(request, global).await
        }

        ProfileCommand::Del { name } => {
            // Deletion only needs the name; the flags are irrelevant.
            let spec = MgmtProfileSpec {
                name,
                services: ServiceFlags::default(),
                permitted_ips: Vec::new(),
            };
            let request = ReconcileRequest::MgmtProfile {
                op: Operation::Delete,
                spec,
            };
            super::run_reconcile(request, global).await
        }

        ProfileCommand::Show { name } => {
            xpath::validate_name("profile name", &name)?;
            let path = xpath::mgmt_profile(&name);
            super::show(&name, &path, global).await
        }
    }
}
