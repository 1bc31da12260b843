//! Acknowledgement frames of the stateless handlers.

use onusim_omci::{OmciClass, OmciMsgType, OmciResponder, OnuKey, FRAME_LEN};

fn frame_for(msg_type: OmciMsgType) -> Vec<u8> {
    let responder = OmciResponder::default();
    responder
        .dispatch(msg_type, OmciClass::ONU_DATA, &[0xde, 0xad], OnuKey::new(0, 0))
        .unwrap()
        .into_vec()
}

/// Build a 48 byte frame from its leading bytes.
fn padded(head: &[u8]) -> Vec<u8> {
    let mut frame = head.to_vec();
    frame.resize(FRAME_LEN, 0x00);
    frame
}

#[test]
fn test_stateless_acknowledgements() {
    let cases = [
        (OmciMsgType::Set, padded(&[0, 0, 0, 0, 0x01, 0x00, 0x00, 0x00])),
        (OmciMsgType::SynchronizeTime, padded(&[0, 0, 0, 0, 0x01, 0x00, 0x00, 0x00])),
        (
            OmciMsgType::Get,
            padded(&[0, 0, 0, 0, 0x00, 0x2d, 0x02, 0x01, 0x00, 0x20, 0xc0, 0x00]),
        ),
        (
            OmciMsgType::GetAllAlarms,
            padded(&[0, 0, 0, 0, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03]),
        ),
        (
            OmciMsgType::GetAllAlarmsNext,
            padded(&[
                0, 0, 0, 0, 0x00, 0x02, 0x00, 0x00, 0x00, 0x0b, 0x01, 0x02, 0x80, 0x00,
            ]),
        ),
        (
            OmciMsgType::Delete,
            padded(&[0, 0, 0, 0, 0, 0, 0, 0, 0x00, 0x0b, 0x00, 0x00, 0x80, 0x00]),
        ),
        (OmciMsgType::Reboot, padded(&[])),
    ];

    for (msg_type, expected) in cases {
        assert_eq!(frame_for(msg_type), expected, "{}", msg_type);
    }
}

#[test]
fn test_stateless_handlers_are_repeatable() {
    let responder = OmciResponder::default();
    let onu = OnuKey::new(3, 3);
    for msg_type in [OmciMsgType::Get, OmciMsgType::Set, OmciMsgType::Reboot] {
        let first = responder
            .dispatch(msg_type, OmciClass::ONU_DATA, &[], onu)
            .unwrap();
        let second = responder
            .dispatch(msg_type, OmciClass::ONU_DATA, &[], onu)
            .unwrap();
        assert_eq!(first, second);
    }
    // None of them needs or creates ONU state.
    assert!(responder.store().is_empty());
}

#[test]
fn test_mib_reset_acknowledgement() {
    assert_eq!(
        frame_for(OmciMsgType::MibReset),
        padded(&[0, 0, 0, 0, 0x00, 0x02, 0x00, 0x00])
    );
}

#[test]
fn test_dispatch_raw_accepts_flagged_codes() {
    let responder = OmciResponder::default();
    let onu = OnuKey::new(0, 0);
    responder.activate_onu(onu);

    // MIB upload next with the AR bit set.
    let frame = responder.dispatch_raw(0x4e, 2, &[0x00, 0x15], onu).unwrap();
    assert_eq!(frame.class_id(), OmciClass::ANI_G);
    assert_eq!(frame.instance_id(), 0x8001);
}
