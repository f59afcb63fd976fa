//! Command implementations for mailconf-cli

pub mod apply;
pub mod check;
pub mod init;
pub mod provision;
pub mod status;

pub use apply::run_apply;
pub use check::run_check;
pub use init::run_init;
pub use provision::run_provision;
pub use status::run_status;

use std::sync::Arc;

use mailconf_core::{CommandRunner, MailService, ServiceContext, ServiceKind};
use mailconf_meta::Settings;

/// The requested services, or every service in run order when none were named.
///
/// Duplicates are dropped and the canonical order is kept.
pub fn selected(services: &[ServiceKind]) -> Vec<ServiceKind> {
    if services.is_empty() {
        return ServiceKind::ALL.to_vec();
    }
    ServiceKind::ALL
        .into_iter()
        .filter(|kind| services.contains(kind))
        .collect()
}

/// Build the shared context and one service per selected kind.
pub fn build_services(
    settings: &Settings,
    runner: Arc<dyn CommandRunner>,
    services: &[ServiceKind],
) -> (ServiceContext, Vec<Box<dyn MailService>>) {
    let ctx = ServiceContext::from_settings(settings, runner);
    let built = selected(services)
        .into_iter()
        .map(|kind| kind.build(ctx.clone()))
        .collect();
    (ctx, built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_selection_means_all() {
        assert_eq!(selected(&[]), ServiceKind::ALL.to_vec());
    }

    #[test]
    fn selection_keeps_run_order() {
        let picked = selected(&[
            ServiceKind::OpenDmarc,
            ServiceKind::Postfix,
            ServiceKind::OpenDmarc,
        ]);
        assert_eq!(picked, vec![ServiceKind::Postfix, ServiceKind::OpenDmarc]);
    }
}
