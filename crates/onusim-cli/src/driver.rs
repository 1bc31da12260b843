//! OLT side of the exchanges the CLI plays against the responder.

use std::sync::Arc;

use anyhow::{Context, Result};
use onusim_omci::{
    catalogue, OmciClass, OmciConfig, OmciFrame, OmciMsgType, OmciResponder, OnuKey, OnuLifecycle,
};
use serde::Serialize;

/// First GEM port id handed out by [`run_upload`].
pub const GEM_PORT_BASE: u16 = 1024;

/// Outcome of one ONU's provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnuSummary {
    pub onu: OnuKey,
    pub uploads: u16,
    pub overflow: u16,
    pub lifecycle: OnuLifecycle,
    pub gem_port_id: Option<u16>,
}

/// Row of the catalogue listing.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogueRow {
    pub index: usize,
    pub name: &'static str,
    pub class: u16,
    pub rule: String,
}

/// Register `pon_ports * onus` ONUs and provision each one in its own task.
///
/// Summaries come back ordered by PON port, then ONU id.
pub async fn run_upload(
    responder: Arc<OmciResponder>,
    pon_ports: u32,
    onus: u32,
) -> Result<Vec<OnuSummary>> {
    let mut handles = Vec::new();
    for intf_id in 0..pon_ports {
        for onu_id in 0..onus {
            let key = OnuKey::new(intf_id, onu_id);
            let gem_port_id = intf_id
                .checked_mul(onus)
                .and_then(|index| index.checked_add(onu_id))
                .and_then(|index| index.checked_add(u32::from(GEM_PORT_BASE)))
                .and_then(|id| u16::try_from(id).ok())
                .with_context(|| format!("no GEM port id left for ONU {}", key))?;

            responder.activate_onu(key);
            let responder = responder.clone();
            handles.push(tokio::spawn(async move {
                provision_onu(&responder, key, gem_port_id).await
            }));
        }
    }

    tracing::info!(onus = handles.len(), "Provisioning started");

    let mut summaries = Vec::with_capacity(handles.len());
    for handle in handles {
        summaries.push(handle.await.context("provisioning task failed")??);
    }
    Ok(summaries)
}

/// MIB reset, MIB upload, every announced upload next step, then GEM port
/// creation.
async fn provision_onu(
    responder: &OmciResponder,
    key: OnuKey,
    gem_port_id: u16,
) -> Result<OnuSummary> {
    responder.dispatch(OmciMsgType::MibReset, OmciClass::ONU_DATA, &[], key)?;

    let announced = responder
        .dispatch(OmciMsgType::MibUpload, OmciClass::ONU_DATA, &[], key)?
        .announced_uploads();

    for command in 0..announced {
        let result = responder.dispatch(
            OmciMsgType::MibUploadNext,
            OmciClass::ONU_DATA,
            &command.to_be_bytes(),
            key,
        );
        match result {
            Ok(_) => {}
            // Announced count runs past the catalogue; the ONU keeps answering.
            Err(e) if e.is_recoverable() => tracing::debug!(onu = %key, command, "{}", e),
            Err(e) => return Err(e.into()),
        }
        tokio::task::yield_now().await;
    }

    responder.dispatch(
        OmciMsgType::Create,
        OmciClass::GEM_PORT_NETWORK_CTP,
        &gem_port_id.to_be_bytes(),
        key,
    )?;

    let state = responder
        .store()
        .get(&key)
        .with_context(|| format!("ONU {} disappeared during provisioning", key))?;

    Ok(OnuSummary {
        onu: key,
        uploads: state.mib_upload_ctr,
        overflow: state.extra_mib_upload_ctr,
        lifecycle: state.lifecycle(),
        gem_port_id: state.gem_port_id(),
    })
}

pub fn catalogue_rows() -> Vec<CatalogueRow> {
    catalogue()
        .iter()
        .enumerate()
        .map(|(index, entry)| CatalogueRow {
            index,
            name: entry.name,
            class: entry.class.id(),
            rule: format!("{:?}", entry.rule),
        })
        .collect()
}

/// Frame a fresh ONU returns for upload next `index` after replaying every
/// index before it.
pub fn frame_at(config: OmciConfig, index: u16) -> Result<OmciFrame> {
    let responder = OmciResponder::new(config)?;
    let key = OnuKey::new(0, 0);
    responder.activate_onu(key);

    let mut last = None;
    for command in 0..=index {
        let frame = responder
            .dispatch(
                OmciMsgType::MibUploadNext,
                OmciClass::ONU_DATA,
                &command.to_be_bytes(),
                key,
            )
            .with_context(|| format!("upload next {} failed", command))?;
        last = Some(frame);
    }
    last.context("no frame produced")
}
